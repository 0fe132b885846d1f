//! Project manager - coordinates project files and live sessions
//!
//! Ties a `ProjectStore` to a `SessionMaterializer`: creating projects,
//! checking for them, and turning them into tmux sessions.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{info, instrument};

use crate::config::{Config, FileProjectStore, ProjectStore};
use crate::error::{Error, ProjectError, Result};
use crate::project::{Project, validate_project_name};
use crate::tmux::{Multiplexer, SessionMaterializer, TmuxExecutor};

/// Project manager coordinates all project and session operations
pub struct ProjectManager<S, M> {
    /// Project files
    store: S,
    /// Session layout driver
    materializer: SessionMaterializer<M>,
}

impl ProjectManager<FileProjectStore, TmuxExecutor> {
    /// Create a manager backed by the configured project directory and tmux
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            FileProjectStore::from_config(config)?,
            TmuxExecutor::from_config(config),
        ))
    }
}

impl<S: ProjectStore, M: Multiplexer> ProjectManager<S, M> {
    /// Create a new project manager
    pub fn new(store: S, mux: M) -> Self {
        Self {
            store,
            materializer: SessionMaterializer::new(mux),
        }
    }

    /// The project store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The multiplexer sessions are created through
    pub fn mux(&self) -> &M {
        self.materializer.mux()
    }

    /// Build the default single-window project and persist it
    #[instrument(skip(self))]
    pub fn create_project(&self, name: &str, start_directory: PathBuf) -> Result<Project> {
        validate_project_name(name)?;

        let project = Project::new(name, start_directory);
        self.store.save(&project)?;

        info!("Created project '{}'", name);
        Ok(project)
    }

    /// Whether a project file exists for `name`
    pub fn project_exists(&self, name: &str) -> Result<bool> {
        self.store.exists(name)
    }

    /// Create a project and bring up its session. Fails if the project
    /// already exists; existing projects are started with `open_session`.
    #[instrument(skip(self))]
    pub async fn new_session(&self, name: &str, start_directory: PathBuf) -> Result<Project> {
        validate_project_name(name)?;

        if self.exists_or_empty(name)? {
            // `exists` also sees stray files such as notes.txt, which `open` can't load
            if self.store.list()?.iter().any(|p| p == name) {
                return Err(ProjectError::AlreadyExists(name.to_string()).into());
            }
            return Err(ProjectError::NameInUse(name.to_string()).into());
        }

        let project = self.create_project(name, start_directory)?;
        self.materializer.materialize(&project).await?;
        Ok(project)
    }

    /// Load a stored project and bring up its session
    #[instrument(skip(self))]
    pub async fn open_session(&self, name: &str) -> Result<Project> {
        let project = self.store.load(name)?;
        self.materializer.materialize(&project).await?;
        Ok(project)
    }

    /// Whether the session is currently live
    pub async fn has_session(&self, name: &str) -> Result<bool> {
        self.mux().session_exists(name).await
    }

    /// Attach the terminal to a session
    pub async fn attach_session(&self, name: &str) -> Result<()> {
        self.mux().attach(name).await
    }

    /// Switch the current tmux client to a session
    pub async fn switch_session(&self, name: &str) -> Result<()> {
        self.mux().switch_client(name).await
    }

    /// Names of all stored projects
    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Delete a stored project
    pub fn delete_project(&self, name: &str) -> Result<()> {
        self.store.remove(name)
    }

    /// `exists`, treating a project directory that was never created as empty
    fn exists_or_empty(&self, name: &str) -> Result<bool> {
        match self.store.exists(name) {
            Err(Error::Project(ProjectError::DirectoryWalk { ref source, .. }))
                if source.kind() == ErrorKind::NotFound =>
            {
                Ok(false)
            }
            other => other,
        }
    }
}
