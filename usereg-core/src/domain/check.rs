//! Results of talking to the portal

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountInfo;

/// Body the login endpoint answers with when it accepts the credentials
pub const LOGIN_ACCEPTED: &str = "ok";

/// How the portal answered a login request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reply", rename_all = "lowercase")]
pub enum LoginOutcome {
    Accepted,
    /// Rejected, with the portal's reply
    Rejected(String),
}

impl LoginOutcome {
    /// Interpret a login response body. Only an exact `ok` is accepted.
    pub fn from_body(body: &str) -> Self {
        if body == LOGIN_ACCEPTED {
            Self::Accepted
        } else {
            Self::Rejected(body.to_string())
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Snapshot produced by one completed check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub checked_at: DateTime<Utc>,
    pub login: LoginOutcome,
    /// Present only when the login was accepted and the info page parsed
    pub info: Option<AccountInfo>,
}

/// A device currently online under the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineSession {
    /// Identifier used to drop the session
    pub id: String,
    pub ip: String,
    pub start_time: DateTime<FixedOffset>,
    pub usage_bytes: u64,
    pub device_name: String,
}
