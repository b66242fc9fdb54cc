use crate::rewrite::RewriteFailure;
use serde::Serialize;

/// What caused a text update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "command", rename_all = "snake_case")]
pub enum UpdateOrigin {
    /// A structural edit, named by its command.
    Edit(&'static str),
    Undo,
    Redo,
    /// Text replaced wholesale, e.g. from a text editor.
    External,
}

/// Published after every edit attempt. A failed attempt carries the same
/// text on both sides plus the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeUpdated {
    pub previous_text: String,
    pub new_text: String,
    pub origin: UpdateOrigin,
    pub failure: Option<RewriteFailure>,
}

impl CodeUpdated {
    pub fn changed(&self) -> bool {
        self.previous_text != self.new_text
    }
}

pub type Listener = Box<dyn FnMut(&CodeUpdated)>;

/// Handle returned by [`super::Session::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
