//! CLI command implementations

pub mod check;
pub mod connect;
pub mod digest;
pub mod logout;
pub mod sessions;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Password;
use tracing_subscriber::EnvFilter;
use usereg_core::{Account, UseregContext};

use crate::CredentialArgs;

/// Install the tracing subscriber
///
/// `USEREG_LOG` takes an EnvFilter directive and wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "usereg_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("USEREG_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Get the usereg directory from environment or default
pub fn get_usereg_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("USEREG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".usereg"))
}

/// Load configuration and build the services
pub fn get_context() -> Result<UseregContext> {
    let usereg_dir = get_usereg_dir()?;
    UseregContext::new(&usereg_dir).context("Failed to initialize usereg context")
}

/// Get password from the flag, USEREG_PASSWORD, or an interactive prompt
pub fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var("USEREG_PASSWORD") {
        return Ok(p);
    }

    let p = Password::new().with_prompt(prompt).interact()?;
    Ok(p)
}

/// Build the account named on the command line
pub fn account_from_args(ctx: &UseregContext, args: &CredentialArgs) -> Result<Account> {
    let username = args
        .username
        .clone()
        .or_else(|| ctx.config.username.clone())
        .context("No username given. Pass --username or set \"username\" in settings.json")?;

    let account = match &args.digest {
        Some(digest) => Account::new(username, digest, true)?,
        None => {
            let password = get_password_or_prompt(args.password.clone(), "Password")?;
            Account::new(username, &password, false)?
        }
    };
    Ok(account)
}
