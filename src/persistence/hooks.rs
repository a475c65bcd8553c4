//! Game collaborators: save/load/render callbacks and the game handle

use std::any::Any;
use std::rc::Rc;

/// How a save should present itself to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// No toast or confirmation (autosave ticks, exit)
    Silent,
    /// Regular user-initiated save with feedback
    Interactive,
}

impl SaveMode {
    pub fn is_silent(&self) -> bool {
        *self == SaveMode::Silent
    }
}

pub type SaveFn = Box<dyn Fn(SaveMode) -> bool>;
pub type LoadFn = Box<dyn Fn() -> bool>;
pub type RenderFn = Box<dyn Fn()>;

/// Callbacks into the game, supplied at construction
///
/// Any of the three may be left unwired. A missing save or render hook is a
/// no-op; a missing load hook makes every restore fail.
#[derive(Default)]
pub struct GameHooks {
    save: Option<SaveFn>,
    load: Option<LoadFn>,
    render: Option<RenderFn>,
}

impl GameHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize live state into the save blob key. The return value is
    /// informational only.
    pub fn with_save(mut self, save: impl Fn(SaveMode) -> bool + 'static) -> Self {
        self.save = Some(Box::new(save));
        self
    }

    /// Deserialize the save blob into live state; false on failure
    pub fn with_load(mut self, load: impl Fn() -> bool + 'static) -> Self {
        self.load = Some(Box::new(load));
        self
    }

    /// Refresh all UI from live state
    pub fn with_render(mut self, render: impl Fn() + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn has_save(&self) -> bool {
        self.save.is_some()
    }

    pub fn has_load(&self) -> bool {
        self.load.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    /// `None` when no save hook is wired
    pub(crate) fn save(&self, mode: SaveMode) -> Option<bool> {
        self.save.as_ref().map(|save| save(mode))
    }

    pub(crate) fn load(&self) -> Option<bool> {
        self.load.as_ref().map(|load| load())
    }

    /// Returns whether a render hook ran
    pub(crate) fn render(&self) -> bool {
        match &self.render {
            Some(render) => {
                render();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for GameHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameHooks")
            .field("save", &self.has_save())
            .field("load", &self.has_load())
            .field("render", &self.has_render())
            .finish()
    }
}

/// Opaque reference to the live game; its presence gates autosaving
#[derive(Clone)]
pub struct GameHandle(Rc<dyn Any>);

impl GameHandle {
    pub fn new<T: Any>(game: Rc<T>) -> Self {
        Self(game)
    }

    /// Recover the concrete game type
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.0).downcast::<T>().ok()
    }
}

impl std::fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GameHandle(..)")
    }
}
