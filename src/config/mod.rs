//! Configuration and persistence module
//!
//! Handles:
//! - User configuration (`config.toml`, `TMUXSPACE_*` environment variables)
//! - Project files (`<config-root>/tmuxspace/<name>.yaml`)

mod settings;
mod storage;

pub use settings::*;
pub use storage::*;
