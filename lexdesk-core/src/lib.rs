//! LexDesk Core - shared infrastructure for the LexDesk client
//!
//! Error taxonomy, logging bootstrap and configuration handling used by
//! every other crate in the workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
