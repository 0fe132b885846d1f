//! Error types for tmuxspace
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for tmuxspace
#[derive(Error, Debug)]
pub enum Error {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Tmux error: {0}")]
    Tmux(#[from] TmuxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Project definition and storage errors
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Could not create project directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open project file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {0:?}")]
    NotRegularFile(PathBuf),

    #[error("Could not render project '{name}': {reason}")]
    TemplateRender { name: String, reason: String },

    #[error("Could not walk project directory {path:?}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Project {0} already exists")]
    AlreadyExists(String),

    #[error("'{0}' is taken by a file in the project directory that is not a project")]
    NameInUse(String),

    #[error("Failed to parse project file {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid project name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Project '{0}' has no windows")]
    NoWindows(String),

    #[error("Window '{window}' in project '{project}' has no panes")]
    EmptyWindow { project: String, window: String },
}

/// Tmux integration errors
#[derive(Error, Debug)]
pub enum TmuxError {
    #[error("Tmux is not installed or not in PATH")]
    NotInstalled,

    #[error("Tmux command failed: {command} - {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Tmux command timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Could not create session, {name}")]
    SessionCreation { name: String },

    #[error("Could not create window '{window}' in session {session}")]
    WindowCreation { session: String, window: String },

    #[error("Session '{0}' not found in tmux")]
    SessionLookup(String),

    #[error("Session could not be attached, {0}")]
    SessionAttach(String),

    #[error("Session could not be switched, {0}")]
    SessionSwitch(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
