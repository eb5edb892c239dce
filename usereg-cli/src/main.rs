//! usereg CLI - check campus network accounts from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod output;

use commands::{check, connect, digest, logout, sessions};

/// usereg - campus network account checker
#[derive(Parser)]
#[command(name = "usereg", version, about, long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Account selection shared by every portal command
#[derive(Args, Clone)]
pub struct CredentialArgs {
    /// Account username (defaults to the one in settings.json)
    #[arg(long, short)]
    pub username: Option<String>,
    /// Plaintext password
    #[arg(long, short, conflicts_with = "digest")]
    pub password: Option<String>,
    /// Pre-computed 32-character password digest
    #[arg(long)]
    pub digest: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an account and show balance and usage
    Check {
        #[command(flatten)]
        credentials: CredentialArgs,
        /// Keep the login result when the account page can't be read
        #[arg(long)]
        keep_login: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the portal digest of a password
    Digest {
        /// Password to digest (prompted if omitted)
        password: Option<String>,
    },

    /// List devices online under an account
    Sessions {
        #[command(flatten)]
        credentials: CredentialArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log out an online session
    Logout {
        /// Session id (see `usereg sessions`)
        id: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Bring an IP address online under an account
    Connect {
        /// IP address to connect
        ip: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check { credentials, keep_login, json } => check::run(&credentials, keep_login, json),
        Commands::Digest { password } => digest::run(password).map(|()| ExitCode::SUCCESS),
        Commands::Sessions { credentials, json } => {
            sessions::run(&credentials, json).map(|()| ExitCode::SUCCESS)
        }
        Commands::Logout { id, credentials } => {
            logout::run(&credentials, &id).map(|()| ExitCode::SUCCESS)
        }
        Commands::Connect { ip, credentials } => {
            connect::run(&credentials, &ip).map(|()| ExitCode::SUCCESS)
        }
    }
}
