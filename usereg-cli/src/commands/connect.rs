//! Connect command - bring an IP address online

use anyhow::Result;

use super::{account_from_args, get_context};
use crate::output;
use crate::CredentialArgs;

pub fn run(credentials: &CredentialArgs, ip: &str) -> Result<()> {
    let ctx = get_context()?;
    let account = account_from_args(&ctx, credentials)?;

    ctx.session_service.connect_ip(&account, ip)?;
    output::success(&format!("Connect request sent for {}", ip));
    Ok(())
}
