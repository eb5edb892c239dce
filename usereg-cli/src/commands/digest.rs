//! Digest command - print the portal credential digest of a password

use anyhow::Result;
use usereg_core::CredentialDigest;

use super::get_password_or_prompt;

pub fn run(password: Option<String>) -> Result<()> {
    let password = get_password_or_prompt(password, "Password")?;
    println!("{}", CredentialDigest::from_password(&password).as_str());
    Ok(())
}
