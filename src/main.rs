mod cli;
mod commands;
mod config;
mod error;
mod filter;
mod glpi;
mod logger;
mod output;
mod requirements;
mod reservations;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{
    handle_computers_command,
    handle_filter_command,
    handle_project_command,
    handle_reservations_command,
    handle_reserve_command,
};
use config::Settings;
use output::print_error;

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load_file_config(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.ip, cli.token, cli.no_verify, file_config)?;

    match &cli.command {
        Commands::Filter { list, all, format } => handle_filter_command(&settings, list, *all, format),
        Commands::Computers { format } => handle_computers_command(&settings, format),
        Commands::Reservations { identifier, user, format } => {
            handle_reservations_command(&settings, identifier.as_deref(), user.as_deref(), format)
        }
        Commands::Project { jira, format } => handle_project_command(&settings, jira, format),
        Commands::Reserve { list, yes } => handle_reserve_command(&settings, list, *yes),
    }
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
