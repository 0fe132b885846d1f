//! tmux command execution
//!
//! Provides the `Multiplexer` capability and its tmux-backed implementation:
//! - Each command is awaited before the next is issued
//! - Optional per-command timeout (none by default)
//! - Non-zero exits mapped to one error kind per command category

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result, TmuxError};

/// Default tmux program
pub const DEFAULT_PROGRAM: &str = "tmux";

/// Operations the session layout needs from a terminal multiplexer
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Create a detached session with its first window. A session by that
    /// name that is already running counts as success and is left as is.
    async fn new_session(&self, session: &str, window: &str, start_directory: &Path)
    -> Result<()>;

    /// Append a window to a session, after its current window
    async fn new_window(&self, session: &str, window: &str, start_directory: &Path) -> Result<()>;

    /// Succeeds if the session is live, `TmuxError::SessionLookup` otherwise
    async fn has_session(&self, session: &str) -> Result<()>;

    /// Attach the invoking terminal to a session
    async fn attach(&self, session: &str) -> Result<()>;

    /// Switch the invoking client to a session
    async fn switch_client(&self, session: &str) -> Result<()>;

    /// `has_session` as a boolean
    async fn session_exists(&self, session: &str) -> Result<bool> {
        match self.has_session(session).await {
            Ok(()) => Ok(true),
            Err(Error::Tmux(TmuxError::SessionLookup(_))) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// tmux command executor
#[derive(Debug, Clone)]
pub struct TmuxExecutor {
    /// tmux binary
    program: String,
    /// Server socket name (`-L`), the default server when unset
    socket: Option<String>,
    /// Command timeout, unbounded when unset
    timeout: Option<Duration>,
}

impl TmuxExecutor {
    /// Create a new executor with default settings
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Create an executor for a specific tmux binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            socket: None,
            timeout: None,
        }
    }

    /// Create an executor from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let mut executor = Self::with_program(config.tmux_program.clone());
        if let Some(ref socket) = config.tmux_socket {
            executor = executor.with_socket(socket.clone());
        }
        match config.command_timeout() {
            Some(t) => executor.with_timeout(t),
            None => executor,
        }
    }

    /// Set the command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Talk to the tmux server on a named socket instead of the default one
    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    /// Check if tmux is installed and accessible
    pub async fn check_installed(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("-V")
            .output()
            .await
            .map_err(|_| TmuxError::NotInstalled)?;

        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            debug!("tmux version: {}", version.trim());
            Ok(())
        } else {
            Err(TmuxError::NotInstalled.into())
        }
    }

    /// Execute a tmux command and return its output
    #[instrument(skip(self), fields(args = ?args))]
    pub async fn execute(&self, args: &[&str]) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = self
            .bounded(cmd.output())
            .await?
            .map_err(|e| self.spawn_error(args, e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(TmuxError::CommandFailed {
                command: self.render(args),
                stderr,
            }
            .into())
        }
    }

    /// Execute a tmux command attached to the caller's terminal
    #[instrument(skip(self), fields(args = ?args))]
    pub async fn execute_interactive(&self, args: &[&str]) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let status = self
            .bounded(cmd.status())
            .await?
            .map_err(|e| self.spawn_error(args, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(TmuxError::CommandFailed {
                command: self.render(args),
                stderr: status.to_string(),
            }
            .into())
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(ref socket) = self.socket {
            cmd.arg("-L").arg(socket);
        }
        cmd
    }

    async fn bounded<F, T>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = T>,
    {
        match self.timeout {
            Some(limit) => timeout(limit, fut)
                .await
                .map_err(|_| TmuxError::Timeout(limit).into()),
            None => Ok(fut.await),
        }
    }

    fn spawn_error(&self, args: &[&str], e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            return TmuxError::NotInstalled.into();
        }
        warn!("tmux command failed: {}", e);
        TmuxError::CommandFailed {
            command: self.render(args),
            stderr: e.to_string(),
        }
        .into()
    }

    fn render(&self, args: &[&str]) -> String {
        match self.socket {
            Some(ref socket) => format!("{} -L {} {}", self.program, socket, args.join(" ")),
            None => format!("{} {}", self.program, args.join(" ")),
        }
    }
}

impl Default for TmuxExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace a non-zero exit with the category error, keeping spawn failures
/// and timeouts as they are.
fn on_exit_failure(result: Result<()>, category: TmuxError) -> Result<()> {
    match result {
        Err(Error::Tmux(TmuxError::CommandFailed { command, stderr })) => {
            debug!("{} exited unsuccessfully: {}", command, stderr);
            Err(category.into())
        }
        other => other,
    }
}

/// Target matching exactly one session name, not a prefix
fn exact_session(session: &str) -> String {
    format!("={}", session)
}

/// Arguments for `new-session`. An empty directory leaves out `-c` so tmux
/// falls back to its own default.
fn new_session_args(session: &str, window: &str, start_directory: &Path) -> Vec<String> {
    // -d: detached, -s: session, -n: first window, -c: directory
    let mut args: Vec<String> = ["new-session", "-d", "-s", session, "-n", window]
        .iter()
        .map(|a| a.to_string())
        .collect();
    push_start_directory(&mut args, start_directory);
    args
}

/// Arguments for `new-window`, inserted after the session's current window
fn new_window_args(session: &str, window: &str, start_directory: &Path) -> Vec<String> {
    let target = format!("{}:", exact_session(session));
    // -a: insert after the target's current window
    let mut args: Vec<String> = ["new-window", "-a", "-t", target.as_str(), "-n", window]
        .iter()
        .map(|a| a.to_string())
        .collect();
    push_start_directory(&mut args, start_directory);
    args
}

fn push_start_directory(args: &mut Vec<String>, start_directory: &Path) {
    if !start_directory.as_os_str().is_empty() {
        args.push("-c".to_string());
        args.push(start_directory.to_string_lossy().into_owned());
    }
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

#[async_trait]
impl Multiplexer for TmuxExecutor {
    async fn new_session(
        &self,
        session: &str,
        window: &str,
        start_directory: &Path,
    ) -> Result<()> {
        // `new-session -A` would turn into an attach, which needs a terminal
        if self.session_exists(session).await? {
            debug!("Session '{}' already running, keeping it", session);
            return Ok(());
        }

        let args = new_session_args(session, window, start_directory);
        let result = self.execute(&as_strs(&args)).await.map(|_| ());

        on_exit_failure(
            result,
            TmuxError::SessionCreation {
                name: session.to_string(),
            },
        )
    }

    async fn new_window(&self, session: &str, window: &str, start_directory: &Path) -> Result<()> {
        let args = new_window_args(session, window, start_directory);
        let result = self.execute(&as_strs(&args)).await.map(|_| ());

        on_exit_failure(
            result,
            TmuxError::WindowCreation {
                session: session.to_string(),
                window: window.to_string(),
            },
        )
    }

    async fn has_session(&self, session: &str) -> Result<()> {
        let target = exact_session(session);
        let result = self
            .execute(&["has-session", "-t", target.as_str()])
            .await
            .map(|_| ());

        on_exit_failure(result, TmuxError::SessionLookup(session.to_string()))
    }

    async fn attach(&self, session: &str) -> Result<()> {
        let target = exact_session(session);
        let result = self
            .execute_interactive(&["attach-session", "-t", target.as_str()])
            .await;

        on_exit_failure(result, TmuxError::SessionAttach(session.to_string()))
    }

    async fn switch_client(&self, session: &str) -> Result<()> {
        let target = exact_session(session);
        let result = self
            .execute_interactive(&["switch-client", "-t", target.as_str()])
            .await;

        on_exit_failure(result, TmuxError::SessionSwitch(session.to_string()))
    }
}
