//! tmux integration module
//!
//! - `Multiplexer` / `TmuxExecutor` - issue tmux commands and classify failures
//! - `SessionMaterializer` - replay a project layout as a live session

mod executor;
mod layout;

pub use executor::*;
pub use layout::*;
