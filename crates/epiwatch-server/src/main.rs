//! EpiWatch binary entry point

use clap::Parser;
use epiwatch_core::logging::{self, Profile};
use epiwatch_server::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    let profile = if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    logging::init(profile);

    if let Err(e) = cli::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
