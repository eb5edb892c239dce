//! Check command - log in and show balance and usage

use std::process::ExitCode;

use anyhow::Result;
use usereg_core::{Account, AccountInfo, CheckOutcome, ExtractionFailure, OperationResult};

use super::{account_from_args, get_context};
use crate::output::{self, format_balance, format_checked_at, format_size};
use crate::CredentialArgs;

pub fn run(credentials: &CredentialArgs, keep_login: bool, json: bool) -> Result<ExitCode> {
    let mode = if keep_login {
        ExtractionFailure::KeepLogin
    } else {
        ExtractionFailure::Abort
    };
    let ctx = get_context()?.with_extraction_failure(mode);
    let mut account = account_from_args(&ctx, credentials)?;

    let result = ctx.checker.try_check(&mut account);

    if json {
        let report: OperationResult<&Account> = match &result {
            Ok(_) => OperationResult::ok(&account),
            Err(e) => OperationResult::fail(e.to_string())
                .with_context("username", serde_json::json!(account.username())),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    match result {
        Ok(outcome) => {
            print_outcome(&account, &outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output::error(&format!("Check did not finish: {}", e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_outcome(account: &Account, outcome: &CheckOutcome) {
    if !outcome.login.is_accepted() {
        output::warning(&format!("{} was rejected by the portal", account.username()));
        return;
    }
    output::success(&format!("{} is valid", account.username()));

    match detail_rows(outcome) {
        Some(rows) => {
            println!();
            println!("{}", output::detail_table(&rows));
        }
        None => output::warning("The account page could not be read, so balance and usage are unknown"),
    }
    output::note(&format!("Checked at {}", format_checked_at(outcome.checked_at)));
}

/// Rows for the account page read by this check, never older values
fn detail_rows(outcome: &CheckOutcome) -> Option<Vec<(&'static str, String)>> {
    outcome.info.as_ref().map(info_rows)
}

fn info_rows(info: &AccountInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Name", info.display_name.clone()),
        ("ID", info.legal_id.clone()),
        ("Balance", format_balance(info.balance)),
        ("IPv4 usage", format_size(info.ipv4_bytes)),
        ("IPv6 usage", format_size(info.ipv6_bytes)),
    ]
}
