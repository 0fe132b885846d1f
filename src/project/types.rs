//! Core project types
//!
//! A project owns its windows and each window owns its panes. A start
//! directory left unset on a window is inherited from the project, and one
//! left unset on a pane is inherited from its window.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProjectError;

/// Characters that cannot appear in a project name: path separators would
/// escape the project directory, and tmux treats `:` and `.` as target
/// delimiters.
static RESERVED_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\:.\x00]").unwrap());

/// Check that `name` can be used as both a file stem and a tmux session name
pub fn validate_project_name(name: &str) -> Result<(), ProjectError> {
    let invalid = |reason: &str| ProjectError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if RESERVED_NAME_CHARS.is_match(name) {
        return Err(invalid("name must not contain '/', '\\', ':' or '.'"));
    }
    Ok(())
}

/// Declarative description of a tmux session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Session name, also the stem of the project file
    pub name: String,
    /// Directory the session starts in
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_directory: PathBuf,
    /// Windows in creation order; the first is created with the session
    #[serde(default, deserialize_with = "null_as_default")]
    pub windows: Vec<Window>,
}

/// A tmux window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<PathBuf>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub panes: Vec<Pane>,
}

/// A pane within a window
///
/// Panes past the first of each window are kept in the model but not
/// created in the live session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PaneEntry")]
pub struct Pane {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<PathBuf>,
    /// Size hint in percent, unused when materializing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<u8>,
}

/// On-disk pane representation: an empty entry, just the start directory
/// as a bare string, or a full mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum PaneEntry {
    Empty,
    Directory(PathBuf),
    Full(PaneFields),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaneFields {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default)]
    start_directory: Option<PathBuf>,
    #[serde(default)]
    ratio: Option<RatioEntry>,
}

/// Ratios are written either as numbers or as quoted numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RatioEntry {
    Number(u8),
    Text(String),
}

impl TryFrom<RatioEntry> for u8 {
    type Error = String;

    fn try_from(entry: RatioEntry) -> Result<Self, Self::Error> {
        match entry {
            RatioEntry::Number(n) => Ok(n),
            RatioEntry::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("invalid pane ratio '{}', expected 0-255", text)),
        }
    }
}

impl TryFrom<PaneEntry> for Pane {
    type Error = String;

    fn try_from(entry: PaneEntry) -> Result<Self, Self::Error> {
        match entry {
            PaneEntry::Empty => Ok(Pane::default()),
            PaneEntry::Directory(dir) => Ok(Pane {
                start_directory: Some(dir),
                ..Default::default()
            }),
            PaneEntry::Full(fields) => Ok(Pane {
                name: fields.name,
                start_directory: fields.start_directory,
                ratio: fields.ratio.map(u8::try_from).transpose()?,
            }),
        }
    }
}

/// Read an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Project {
    /// Build the default template: one window named `<name>:0` holding one
    /// pane named `0:0`, both starting in `start_directory`.
    pub fn new(name: impl Into<String>, start_directory: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let start_directory = start_directory.into();

        let pane = Pane {
            name: format!("{}:{}", 0, 0),
            start_directory: Some(start_directory.clone()),
            ratio: None,
        };
        let window = Window {
            name: format!("{}:{}", name, 0),
            start_directory: Some(start_directory.clone()),
            panes: vec![pane],
        };

        Self {
            name,
            start_directory,
            windows: vec![window],
        }
    }

    /// Fill unset window and pane start directories from their parents
    pub fn resolve(&mut self) {
        for window in &mut self.windows {
            let window_dir = non_empty(window.start_directory.take())
                .unwrap_or_else(|| self.start_directory.clone());

            for pane in &mut window.panes {
                let pane_dir = non_empty(pane.start_directory.take())
                    .unwrap_or_else(|| window_dir.clone());
                pane.start_directory = Some(pane_dir);
            }

            window.start_directory = Some(window_dir);
        }
    }

    /// Check the structural invariants: a usable name, at least one window,
    /// and at least one pane per window.
    pub fn validate(&self) -> Result<(), ProjectError> {
        validate_project_name(&self.name)?;

        if self.windows.is_empty() {
            return Err(ProjectError::NoWindows(self.name.clone()));
        }
        if let Some(window) = self.windows.iter().find(|w| w.panes.is_empty()) {
            return Err(ProjectError::EmptyWindow {
                project: self.name.clone(),
                window: window.name.clone(),
            });
        }
        Ok(())
    }

    /// The window created together with the session
    pub fn first_window(&self) -> Option<&Window> {
        self.windows.first()
    }

    /// Effective start directory of a window in this project
    pub fn window_start_directory<'a>(&'a self, window: &'a Window) -> &'a Path {
        window
            .start_directory
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(&self.start_directory)
    }
}

fn non_empty(dir: Option<PathBuf>) -> Option<PathBuf> {
    dir.filter(|d| !d.as_os_str().is_empty())
}
