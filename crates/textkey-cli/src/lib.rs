pub mod bridge;
pub mod cli;
pub mod commands;

use clap::Parser;
use cli::Textkey;
use commands::handle_command;
use std::process;

/// Run the textkey CLI application
pub fn run_main() {
    env_logger::init();

    let args = Textkey::parse();
    let result = handle_command(args.command);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
