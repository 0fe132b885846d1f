//! tmuxspace - declarative tmux session layouts
//!
//! A project describes a tmux session as an ordered list of windows, each
//! with panes and start directories. Projects are stored as YAML files and
//! replayed into live sessions by issuing tmux commands in order.
//!
//! # Modules
//!
//! - [`project`] - Project/Window/Pane model and the `ProjectManager`
//! - [`tmux`] - tmux command execution and session materialization
//! - [`config`] - Application settings and project file storage
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod project;
pub mod tmux;

pub use config::{Config, FileProjectStore, ProjectStore};
pub use error::{Error, Result};
pub use project::{Pane, Project, ProjectManager, Window};
pub use tmux::{Multiplexer, SessionMaterializer, TmuxExecutor};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
