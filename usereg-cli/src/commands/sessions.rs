//! Sessions command - list devices online under an account

use anyhow::Result;
use colored::Colorize;

use super::{account_from_args, get_context};
use crate::output::{self, format_size};
use crate::CredentialArgs;

pub fn run(credentials: &CredentialArgs, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let account = account_from_args(&ctx, credentials)?;
    let sessions = ctx.session_service.list_sessions(&account)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        output::note("No devices online");
        return Ok(());
    }

    println!("{}", format!("Online sessions for {}", account.username()).bold());
    let mut table = output::list_table(&["ID", "IP", "Since", "Usage", "Device"]);
    for session in &sessions {
        table.add_row(vec![
            session.id.clone(),
            session.ip.clone(),
            session.start_time.format("%Y-%m-%d %H:%M").to_string(),
            format_size(session.usage_bytes),
            session.device_name.clone(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
