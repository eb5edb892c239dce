//! Account checker - login, then scrape the account page
//!
//! Every check opens a new portal session, so cookies never leak from one
//! check to the next. The whole login + fetch + parse sequence runs before
//! the account is touched: a check either completes and is applied in one
//! step, or fails and leaves the account exactly as it was.
//!
//! `&mut Account` keeps two checks from running on one account at once.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::adapters::usereg::UseregConnector;
use crate::config::PortalConfig;
use crate::domain::result::Result;
use crate::domain::{Account, AccountInfo, CheckOutcome, CredentialDigest, LoginOutcome};
use crate::ports::{Portal, PortalConnector};

use super::extract::parse_account_info;

/// What to do when login succeeds but the account page can't be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// Report the whole check as not finished
    #[default]
    Abort,
    /// Record the accepted login and keep the previous info fields
    KeepLogin,
}

/// Checks portal accounts
pub struct AccountChecker<C = UseregConnector> {
    connector: C,
    on_extraction_failure: ExtractionFailure,
}

impl AccountChecker<UseregConnector> {
    pub fn new(config: PortalConfig) -> Self {
        Self::with_connector(UseregConnector::new(config))
    }
}

impl<C: PortalConnector> AccountChecker<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            on_extraction_failure: ExtractionFailure::default(),
        }
    }

    /// Choose how extraction faults after an accepted login are reported
    pub fn on_extraction_failure(mut self, mode: ExtractionFailure) -> Self {
        self.on_extraction_failure = mode;
        self
    }

    /// Check the account against the portal.
    ///
    /// Returns `true` when the check ran to completion, whether or not the
    /// portal accepted the credentials; `account.is_valid()` tells which.
    /// Returns `false` when anything went wrong along the way, in which case
    /// the account is left unchanged.
    pub fn check(&self, account: &mut Account) -> bool {
        match self.try_check(account) {
            Ok(_) => true,
            Err(e) => {
                warn!(username = account.username(), error = %e, "account check did not finish");
                false
            }
        }
    }

    /// Like [`check`](Self::check), but reports why a check did not finish
    pub fn try_check(&self, account: &mut Account) -> Result<CheckOutcome> {
        let outcome = self.run(account.username(), account.credential())?;
        account.apply(&outcome);
        Ok(outcome)
    }

    fn run(&self, username: &str, credential: &CredentialDigest) -> Result<CheckOutcome> {
        let session = self.connector.open()?;

        debug!(username, "logging in");
        let login = session.login(username, credential)?;

        let info = match &login {
            LoginOutcome::Accepted => {
                info!(username, "login accepted");
                match fetch_info(&session) {
                    Ok(info) => Some(info),
                    Err(e) if self.on_extraction_failure == ExtractionFailure::KeepLogin => {
                        warn!(username, error = %e, "account page unreadable, keeping login result");
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            LoginOutcome::Rejected(reply) => {
                info!(username, reply = reply.as_str(), "login rejected");
                None
            }
        };

        Ok(CheckOutcome {
            checked_at: Utc::now(),
            login,
            info,
        })
    }
}

fn fetch_info<P: Portal>(session: &P) -> Result<AccountInfo> {
    let page = session.fetch_info_page()?;
    parse_account_info(&page)
}
