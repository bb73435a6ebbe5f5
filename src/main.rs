//! `roo-md` entry point.
//!
//! Parses arguments, runs the command and prints failures with a suggestion
//! when one is known.

use clap::Parser;
use roo_metadata::cli::Cli;
use roo_metadata::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
