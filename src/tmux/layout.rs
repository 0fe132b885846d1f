//! Session materialization
//!
//! Turns a `Project` into a live session. tmux creates the first window as
//! part of `new-session`, so only windows after the first are created
//! explicitly, in declaration order. The first failure aborts the sequence;
//! windows already created stay in the session.

use tracing::{debug, info, instrument};

use crate::error::{ProjectError, Result};
use crate::project::Project;

use super::Multiplexer;

/// Applies project layouts through a `Multiplexer`
pub struct SessionMaterializer<M> {
    mux: M,
}

impl<M: Multiplexer> SessionMaterializer<M> {
    /// Create a materializer driving `mux`
    pub fn new(mux: M) -> Self {
        Self { mux }
    }

    /// The underlying multiplexer
    pub fn mux(&self) -> &M {
        &self.mux
    }

    /// Create the project's session, or keep the live one, and append its remaining windows
    #[instrument(skip(self, project), fields(project = %project.name))]
    pub async fn materialize(&self, project: &Project) -> Result<()> {
        project.validate()?;
        let first = project
            .first_window()
            .ok_or_else(|| ProjectError::NoWindows(project.name.clone()))?;

        debug!(
            "Creating session '{}' with window '{}' in {:?}",
            project.name, first.name, project.start_directory
        );
        self.mux
            .new_session(&project.name, &first.name, &project.start_directory)
            .await?;

        for window in project.windows.iter().skip(1) {
            let dir = project.window_start_directory(window);
            debug!("Appending window '{}' in {:?}", window.name, dir);
            self.mux.new_window(&project.name, &window.name, dir).await?;
        }

        let extra_panes: usize = project
            .windows
            .iter()
            .map(|w| w.panes.len().saturating_sub(1))
            .sum();
        if extra_panes > 0 {
            debug!("Skipping {} panes beyond the first of each window", extra_panes);
        }

        info!(
            "Session '{}' ready with {} windows",
            project.name,
            project.windows.len()
        );
        Ok(())
    }
}
