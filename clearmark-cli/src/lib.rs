// clearmark-cli/src/lib.rs
//
// Library portion of the clearmark CLI application.
// Contains argument definitions, command logic and the ingestion server.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod server;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands};
pub use commands::{run_detect, run_erase, run_process, run_serve};
