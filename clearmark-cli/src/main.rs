// clearmark-cli/src/main.rs
//
// Entry point for the `clearmark` binary: parses arguments, sets up logging
// and dispatches to the selected command. Any error ends the process with
// exit code 1.

use clap::Parser;
use clearmark_cli::{logging, run_detect, run_erase, run_process, run_serve, Cli, Commands};
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Erase(args) => run_erase(args),
        Commands::Detect(args) => run_detect(args),
        Commands::Serve(args) => run_serve(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
