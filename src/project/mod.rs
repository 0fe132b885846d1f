//! Project model
//!
//! Defines the declarative layout of a tmux session:
//! - `Project` - one tmux session, persisted as `<name>.yaml`
//! - `Window` - a window within the session
//! - `Pane` - a pane within a window
//!
//! `ProjectManager` ties stored projects to live sessions.

mod manager;
mod types;

pub use manager::*;
pub use types::*;
