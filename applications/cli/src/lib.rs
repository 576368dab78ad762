//! Product Dashboard CLI
//!
//! Building blocks of the `dash` binary: configuration loading, token
//! persistence between runs, and plain-text rendering of page state.

pub mod config;
pub mod error;
pub mod render;
pub mod session_file;

pub use config::CliConfig;
pub use error::{CliError, Result};
pub use session_file::SessionFile;
