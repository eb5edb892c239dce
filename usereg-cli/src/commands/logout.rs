//! Logout command - drop an online session

use anyhow::Result;

use super::{account_from_args, get_context};
use crate::output;
use crate::CredentialArgs;

pub fn run(credentials: &CredentialArgs, id: &str) -> Result<()> {
    let ctx = get_context()?;
    let account = account_from_args(&ctx, credentials)?;

    ctx.session_service.logout_session(&account, id)?;
    output::success(&format!("Logout request sent for session {}", id));
    Ok(())
}
