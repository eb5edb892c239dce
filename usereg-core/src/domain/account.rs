//! Account domain model

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::check::{CheckOutcome, LoginOutcome};
use super::credential::CredentialDigest;
use super::result::Result;

/// Details scraped from the portal's account page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub display_name: String,
    pub legal_id: String,
    /// Remaining balance in yuan
    pub balance: Decimal,
    pub ipv4_bytes: u64,
    pub ipv6_bytes: u64,
}

/// A portal account and the last known state of it
///
/// The account is checked in place: each completed check updates the
/// validity flag and timestamp, and a check with an accepted login also
/// refreshes the info fields. A check that does not finish leaves the
/// account untouched.
#[derive(Clone, Serialize)]
pub struct Account {
    username: String,
    #[serde(skip)]
    credential: CredentialDigest,
    #[serde(flatten)]
    info: AccountInfo,
    last_checked_at: Option<DateTime<Utc>>,
    is_valid: bool,
}

impl Account {
    /// Create an account from a username and either a plaintext password or,
    /// when `is_digest` is set, an already computed 32-character digest.
    pub fn new(username: impl Into<String>, password: &str, is_digest: bool) -> Result<Self> {
        let credential = CredentialDigest::new(password, is_digest)?;
        Ok(Self::with_credential(username, credential))
    }

    pub fn with_credential(username: impl Into<String>, credential: CredentialDigest) -> Self {
        Self {
            username: username.into(),
            credential,
            info: AccountInfo::default(),
            last_checked_at: None,
            is_valid: false,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn credential(&self) -> &CredentialDigest {
        &self.credential
    }

    pub fn info(&self) -> &AccountInfo {
        &self.info
    }

    pub fn display_name(&self) -> &str {
        &self.info.display_name
    }

    pub fn legal_id(&self) -> &str {
        &self.info.legal_id
    }

    pub fn balance(&self) -> Decimal {
        self.info.balance
    }

    pub fn ipv4_bytes(&self) -> u64 {
        self.info.ipv4_bytes
    }

    pub fn ipv6_bytes(&self) -> u64 {
        self.info.ipv6_bytes
    }

    pub fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Record a completed check
    pub fn apply(&mut self, outcome: &CheckOutcome) {
        self.is_valid = matches!(outcome.login, LoginOutcome::Accepted);
        if let Some(info) = &outcome.info {
            self.info = info.clone();
        }
        self.last_checked_at = Some(outcome.checked_at);
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("is_valid", &self.is_valid)
            .field("ipv4_bytes", &self.info.ipv4_bytes)
            .field("balance", &self.info.balance)
            .field("last_checked_at", &self.last_checked_at)
            .finish()
    }
}
