//! Portal port
//!
//! Defines the interface to the usereg web portal. One `Portal` value is one
//! browser-like session: cookies set by `login` are carried by every later
//! request made through the same value.

use crate::domain::check::LoginOutcome;
use crate::domain::credential::CredentialDigest;
use crate::domain::result::Result;

/// A single cookie-carrying session with the portal
pub trait Portal {
    /// Submit the login form
    fn login(&self, username: &str, credential: &CredentialDigest) -> Result<LoginOutcome>;

    /// Fetch the HTML of the account details page
    fn fetch_info_page(&self) -> Result<String>;

    /// Fetch the HTML of the online sessions page
    fn fetch_sessions_page(&self) -> Result<String>;

    /// Ask the portal to drop an online session, returning the portal's reply
    fn drop_session(&self, session_id: &str) -> Result<String>;

    /// Ask the portal to bring an IP address online, returning the portal's reply
    fn connect_ip(&self, ip: &str) -> Result<String>;
}

/// Opens fresh portal sessions
///
/// Each check or session operation asks for a new session so no cookies are
/// shared between calls.
pub trait PortalConnector {
    type Session: Portal;

    fn open(&self) -> Result<Self::Session>;
}
