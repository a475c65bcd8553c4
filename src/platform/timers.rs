//! Periodic and before-exit timers
//!
//! - `TimerHost`: registers callbacks, returns cancellable handles
//! - `ManualTimers`: virtual time, driven explicitly (tests, headless runs)
//! - `WebTimers`: `setInterval` + `beforeunload` (WASM only)

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Cancels its timer when cancelled or dropped
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a registration that never happened
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Event-loop timer registration
pub trait TimerHost {
    /// Fire `callback` every `period` until the handle is cancelled
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> TimerHandle;

    /// Fire `callback` when the process/page is about to exit
    fn on_exit(&self, callback: Box<dyn FnMut()>) -> TimerHandle;
}

type Callback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Interval {
    id: u64,
    period_ms: u64,
    next_due_ms: u64,
    callback: Callback,
}

#[derive(Default)]
struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    intervals: Vec<Interval>,
    exit_hooks: Vec<(u64, Callback)>,
}

impl TimerQueue {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Virtual-time timer host
///
/// Nothing fires until `advance` or `fire_exit` is called. Callbacks run with
/// no internal borrow held, so they may register or cancel timers.
#[derive(Clone, Default)]
pub struct ManualTimers {
    queue: Rc<RefCell<TimerQueue>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual milliseconds elapsed since creation
    pub fn now_ms(&self) -> u64 {
        self.queue.borrow().now_ms
    }

    /// Advance virtual time, firing every interval that comes due in order.
    /// Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.queue.borrow().now_ms + by.as_millis() as u64;
        let mut fired = 0;

        loop {
            let next = {
                let queue = self.queue.borrow();
                queue
                    .intervals
                    .iter()
                    .filter(|i| i.next_due_ms <= target)
                    .min_by_key(|i| (i.next_due_ms, i.id))
                    .map(|i| (i.id, i.next_due_ms, Rc::clone(&i.callback)))
            };
            let Some((id, due, callback)) = next else {
                break;
            };

            {
                let mut queue = self.queue.borrow_mut();
                queue.now_ms = due;
                if let Some(interval) = queue.intervals.iter_mut().find(|i| i.id == id) {
                    interval.next_due_ms += interval.period_ms;
                }
            }

            (callback.borrow_mut())();
            fired += 1;
        }

        self.queue.borrow_mut().now_ms = target;
        fired
    }

    /// Simulate process exit: fire every registered exit hook once
    pub fn fire_exit(&self) -> usize {
        let hooks: Vec<Callback> = self
            .queue
            .borrow()
            .exit_hooks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for hook in &hooks {
            (hook.borrow_mut())();
        }
        hooks.len()
    }

    pub fn active_intervals(&self) -> usize {
        self.queue.borrow().intervals.len()
    }

    pub fn active_exit_hooks(&self) -> usize {
        self.queue.borrow().exit_hooks.len()
    }

    fn weak(&self) -> Weak<RefCell<TimerQueue>> {
        Rc::downgrade(&self.queue)
    }
}

impl TimerHost for ManualTimers {
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> TimerHandle {
        let mut queue = self.queue.borrow_mut();
        let id = queue.allocate_id();
        // A zero period would spin forever inside `advance`
        let period_ms = (period.as_millis() as u64).max(1);
        let next_due_ms = queue.now_ms + period_ms;
        queue.intervals.push(Interval {
            id,
            period_ms,
            next_due_ms,
            callback: Rc::new(RefCell::new(callback)),
        });

        let weak = self.weak();
        TimerHandle::new(move || {
            if let Some(queue) = weak.upgrade() {
                queue.borrow_mut().intervals.retain(|i| i.id != id);
            }
        })
    }

    fn on_exit(&self, callback: Box<dyn FnMut()>) -> TimerHandle {
        let mut queue = self.queue.borrow_mut();
        let id = queue.allocate_id();
        queue.exit_hooks.push((id, Rc::new(RefCell::new(callback))));

        let weak = self.weak();
        TimerHandle::new(move || {
            if let Some(queue) = weak.upgrade() {
                queue
                    .borrow_mut()
                    .exit_hooks
                    .retain(|(hook_id, _)| *hook_id != id);
            }
        })
    }
}

/// Browser timer delay in ms, clamped to the `i32` range `setTimeout` accepts
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn browser_delay_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Browser timers: `window.setInterval` and the `beforeunload` event
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WebTimers;

#[cfg(target_arch = "wasm32")]
impl TimerHost for WebTimers {
    fn set_interval(&self, period: Duration, mut callback: Box<dyn FnMut()>) -> TimerHandle {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::Closure;

        let Some(window) = web_sys::window() else {
            log::error!("No window - periodic autosave disabled");
            return TimerHandle::inert();
        };

        let closure = Closure::<dyn FnMut()>::new(move || callback());
        let id = match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            browser_delay_ms(period),
        ) {
            Ok(id) => id,
            Err(e) => {
                log::error!("setInterval failed: {:?}", e);
                return TimerHandle::inert();
            }
        };

        TimerHandle::new(move || {
            window.clear_interval_with_handle(id);
            drop(closure);
        })
    }

    fn on_exit(&self, mut callback: Box<dyn FnMut()>) -> TimerHandle {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::Closure;

        let Some(window) = web_sys::window() else {
            log::error!("No window - save on exit disabled");
            return TimerHandle::inert();
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| callback());
        if let Err(e) = window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to register beforeunload: {:?}", e);
            return TimerHandle::inert();
        }

        TimerHandle::new(move || {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                closure.as_ref().unchecked_ref(),
            );
        })
    }
}
