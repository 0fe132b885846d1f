//! Project file storage
//!
//! One YAML file per project, named `<project name>.yaml`, in a single
//! directory. The directory is created on first save.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ProjectError, Result};
use crate::project::{Project, validate_project_name};

use super::Config;

/// File extension of project files
pub const PROJECT_FILE_EXTENSION: &str = "yaml";

/// Repository of persisted projects
pub trait ProjectStore {
    /// Load a project by name, with directory inheritance applied
    fn load(&self, name: &str) -> Result<Project>;

    /// Persist a project under its name
    fn save(&self, project: &Project) -> Result<()>;

    /// Whether any non-directory entry in the store has `name` as its stem
    fn exists(&self, name: &str) -> Result<bool>;

    /// Names of all stored projects, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a stored project
    fn remove(&self, name: &str) -> Result<()>;
}

/// Directory-backed project store
#[derive(Debug, Clone)]
pub struct FileProjectStore {
    dir: PathBuf,
    /// Replace existing files on save instead of refusing
    overwrite: bool,
}

impl FileProjectStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    /// Create a store from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.projects_dir()?).with_overwrite(config.overwrite_existing))
    }

    /// Allow or forbid replacing existing project files
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Directory holding the project files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, PROJECT_FILE_EXTENSION))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|source| {
                ProjectError::DirectoryCreation {
                    path: self.dir.clone(),
                    source,
                }
            })?;
            debug!("Created project directory {:?}", self.dir);
        }
        Ok(())
    }

    fn walk_error(&self, source: std::io::Error) -> ProjectError {
        ProjectError::DirectoryWalk {
            path: self.dir.clone(),
            source,
        }
    }
}

impl ProjectStore for FileProjectStore {
    fn load(&self, name: &str) -> Result<Project> {
        validate_project_name(name)?;
        let path = self.project_path(name);

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProjectError::NotFound(name.to_string()).into());
            }
            Err(source) => return Err(ProjectError::FileOpen { path, source }.into()),
        };
        if !metadata.is_file() {
            return Err(ProjectError::NotRegularFile(path).into());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ProjectError::FileOpen {
            path: path.clone(),
            source,
        })?;

        let mut project: Project =
            serde_yaml_ng::from_str(&content).map_err(|e| ProjectError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if project.name != name {
            warn!(
                "Project file {:?} declares name '{}', using '{}'",
                path, project.name, name
            );
            project.name = name.to_string();
        }

        project.resolve();
        project.validate()?;

        debug!("Loaded project '{}' with {} windows", name, project.windows.len());
        Ok(project)
    }

    fn save(&self, project: &Project) -> Result<()> {
        validate_project_name(&project.name)?;
        self.ensure_dir()?;

        let path = self.project_path(&project.name);

        // Directories and special files are never written to, even with
        // overwrite. Symlinks are judged by what they point at.
        if let Ok(metadata) = std::fs::metadata(&path) {
            if !metadata.is_file() {
                return Err(ProjectError::NotRegularFile(path).into());
            }
        }

        let content =
            serde_yaml_ng::to_string(project).map_err(|e| ProjectError::TemplateRender {
                name: project.name.clone(),
                reason: e.to_string(),
            })?;

        let mut options = OpenOptions::new();
        if self.overwrite {
            options.write(true).create(true).truncate(true);
        } else {
            options.write(true).create_new(true);
        }

        let mut file = options.open(&path).map_err(|source| {
            if source.kind() == ErrorKind::AlreadyExists {
                ProjectError::AlreadyExists(project.name.clone())
            } else {
                ProjectError::FileOpen {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        file.write_all(content.as_bytes())?;
        file.flush()?;

        info!("Saved project '{}' to {:?}", project.name, path);
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| self.walk_error(e))?;

        for entry in entries {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            let file_type = entry.file_type().map_err(|e| self.walk_error(e))?;
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(name) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn list(&self) -> Result<Vec<String>> {
        // Nothing saved yet
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| self.walk_error(e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            let file_type = entry.file_type().map_err(|e| self.walk_error(e))?;
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROJECT_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_project_name(name)?;
        let path = self.project_path(name);

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed project '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ProjectError::NotFound(name.to_string()).into())
            }
            Err(source) => Err(ProjectError::FileOpen { path, source }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::project::Window;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FileProjectStore {
        FileProjectStore::new(temp_dir.path().join("tmuxspace"))
    }

    #[test]
    fn test_save_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(&Project::new("demo", "/tmp/work")).unwrap();

        let path = temp_dir.path().join("tmuxspace").join("demo.yaml");
        assert!(path.is_file());

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("name: demo"));
        assert!(content.contains("startDirectory: /tmp/work"));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let mut project = Project::new("demo", "/tmp/work");
        project.windows.push(Window {
            name: "logs".to_string(),
            start_directory: Some(PathBuf::from("/var/log")),
            panes: project.windows[0].panes.clone(),
        });
        store.save(&project).unwrap();

        let loaded = store.load("demo").unwrap();
        assert_eq!(loaded.name, project.name);
        assert_eq!(loaded.start_directory, project.start_directory);
        assert_eq!(loaded.windows.len(), 2);
        for (loaded, saved) in loaded.windows.iter().zip(&project.windows) {
            assert_eq!(loaded.name, saved.name);
            assert_eq!(loaded.start_directory, saved.start_directory);
        }
    }

    #[test]
    fn test_save_refuses_existing_project() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(&Project::new("demo", "/a")).unwrap();
        let err = store.save(&Project::new("demo", "/b")).unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::AlreadyExists(_))));

        assert_eq!(store.load("demo").unwrap().start_directory, PathBuf::from("/a"));
    }

    #[test]
    fn test_save_with_overwrite_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir).with_overwrite(true);

        let mut long = Project::new("demo", "/a/very/long/start/directory");
        for i in 1..5 {
            let mut window = long.windows[0].clone();
            window.name = format!("demo:{}", i);
            long.windows.push(window);
        }
        store.save(&long).unwrap();
        store.save(&Project::new("demo", "/b")).unwrap();

        let loaded = store.load("demo").unwrap();
        assert_eq!(loaded.start_directory, PathBuf::from("/b"));
        assert_eq!(loaded.windows.len(), 1);
    }

    #[test]
    fn test_save_rejects_directory_in_place_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir).with_overwrite(true);
        std::fs::create_dir_all(store.project_path("demo")).unwrap();

        let err = store.save(&Project::new("demo", "/a")).unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::NotRegularFile(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_follows_symlinked_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let dotfiles = temp_dir.path().join("dotfiles");
        std::fs::create_dir_all(&dotfiles).unwrap();
        let target = dotfiles.join("demo.yaml");
        std::fs::write(&target, "name: demo\nstartDirectory: /a\n").unwrap();

        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::os::unix::fs::symlink(&target, store.project_path("demo")).unwrap();

        let err = store.save(&Project::new("demo", "/b")).unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::AlreadyExists(_))));

        let store = store.with_overwrite(true);
        store.save(&Project::new("demo", "/b")).unwrap();

        let link = std::fs::symlink_metadata(store.project_path("demo")).unwrap();
        assert!(link.file_type().is_symlink());
        assert_eq!(store.load("demo").unwrap().start_directory, PathBuf::from("/b"));
        assert!(std::fs::read_to_string(&target).unwrap().contains("startDirectory: /b"));
    }

    #[test]
    fn test_save_fails_when_directory_cannot_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = FileProjectStore::new(blocker.join("tmuxspace"));

        let err = store.save(&Project::new("demo", "/a")).unwrap_err();
        assert!(matches!(
            err,
            Error::Project(ProjectError::DirectoryCreation { .. })
        ));
    }

    #[test]
    fn test_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(&Project::new("demo", "/tmp")).unwrap();
        std::fs::create_dir(store.dir().join("folder")).unwrap();

        assert!(store.exists("demo").unwrap());
        assert!(!store.exists("dem").unwrap());
        assert!(!store.exists("demo2").unwrap());
        assert!(!store.exists("folder").unwrap());
    }

    #[test]
    fn test_exists_missing_directory_is_walk_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let err = store.exists("demo").unwrap_err();
        assert!(matches!(
            err,
            Error::Project(ProjectError::DirectoryWalk { .. })
        ));
    }

    #[test]
    fn test_list_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert!(store.list().unwrap().is_empty());

        store.save(&Project::new("web", "/srv/web")).unwrap();
        store.save(&Project::new("api", "/srv/api")).unwrap();
        std::fs::write(store.dir().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["api", "web"]);

        store.remove("api").unwrap();
        assert_eq!(store.list().unwrap(), vec!["web"]);

        let err = store.remove("api").unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_load_missing_project() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let err = store.load("ghost").unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_load_applies_inheritance_and_legacy_panes() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.project_path("demo"),
            "\nname: demo\nstartDirectory: /srv\nwindows:\n- name: demo:0\n  startDirectory: /srv\n  panes:\n  - /srv\n- name: shell\n  panes:\n  - name: '1:0'\n",
        )
        .unwrap();

        let project = store.load("demo").unwrap();
        assert_eq!(project.windows.len(), 2);
        assert_eq!(project.windows[0].panes[0].start_directory, Some(PathBuf::from("/srv")));
        assert_eq!(project.windows[1].start_directory, Some(PathBuf::from("/srv")));
        assert_eq!(project.windows[1].panes[0].start_directory, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn test_load_rejects_project_without_windows() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.project_path("demo"), "name: demo\nstartDirectory: /srv\n").unwrap();

        let err = store.load("demo").unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::NoWindows(_))));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.project_path("demo"), "windows: [unclosed").unwrap();

        let err = store.load("demo").unwrap_err();
        assert!(matches!(err, Error::Project(ProjectError::Parse { .. })));
    }
}
