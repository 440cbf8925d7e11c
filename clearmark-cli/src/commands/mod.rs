//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Detection only; prints regions as JSON lines.
pub mod detect;
/// Frame-folder erasure without ffmpeg.
pub mod erase;
/// Full video pipeline over a file or directory.
pub mod process;
/// HTTP ingestion endpoint.
pub mod serve;

pub use detect::run_detect;
pub use erase::run_erase;
pub use process::run_process;
pub use serve::run_serve;
