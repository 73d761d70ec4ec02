//! Parcel CLI - Database migrations and address inspection.
//!
//! # Usage
//!
//! ```bash
//! # Apply address migrations and create the session table
//! parcel migrate
//!
//! # Print a user's addresses, newest first
//! parcel addresses list --owner 7f9c24e8-3b12-4fef-91e1-2f1c6b1d9a55
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `addresses list` - List one owner's addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "parcel")]
#[command(author, version, about = "Parcel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect stored addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List an owner's addresses, newest first
    List {
        /// Owner (user) id
        #[arg(short, long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Addresses { action } => match action {
            AddressAction::List { owner } => commands::addresses::list(&owner).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_addresses_list() {
        let cli = Cli::try_parse_from(["parcel", "addresses", "list", "--owner", "abc"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Addresses {
                action: AddressAction::List { ref owner }
            }) if owner == "abc"
        ));
    }
}
