//! Online session management
//!
//! Lists the devices logged into the campus network under an account, drops
//! them, and brings new IP addresses online. Each operation logs into the
//! portal on a fresh session first.

use tracing::{debug, info};

use crate::adapters::usereg::UseregConnector;
use crate::config::PortalConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, LoginOutcome, OnlineSession};
use crate::ports::{Portal, PortalConnector};

use super::extract::parse_sessions;

/// Reply when a drop request was queued
pub const DROP_ACCEPTED: &str = "下线请求已发送";
/// Marker in the reply when a connect request was queued
pub const CONNECT_ACCEPTED: &str = "上线请求已发送";

/// Session service for online devices
pub struct SessionService<C = UseregConnector> {
    connector: C,
}

impl SessionService<UseregConnector> {
    pub fn new(config: PortalConfig) -> Self {
        Self::with_connector(UseregConnector::new(config))
    }
}

impl<C: PortalConnector> SessionService<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Log in, failing if the portal rejects the credentials
    fn login(&self, account: &Account) -> Result<C::Session> {
        let session = self.connector.open()?;
        match session.login(account.username(), account.credential())? {
            LoginOutcome::Accepted => Ok(session),
            LoginOutcome::Rejected(reply) => {
                Err(Error::portal(format!("Login rejected: {}", reply)))
            }
        }
    }

    /// List devices currently online
    pub fn list_sessions(&self, account: &Account) -> Result<Vec<OnlineSession>> {
        let session = self.login(account)?;
        let page = session.fetch_sessions_page()?;
        let sessions = parse_sessions(&page)?;
        debug!(username = account.username(), count = sessions.len(), "fetched online sessions");
        Ok(sessions)
    }

    /// Drop one online session by its id
    pub fn logout_session(&self, account: &Account, session_id: &str) -> Result<()> {
        let session = self.login(account)?;
        let reply = session.drop_session(session_id)?;
        if reply != DROP_ACCEPTED {
            return Err(Error::portal(format!(
                "Failed to log out session {}: {}",
                session_id, reply
            )));
        }
        info!(username = account.username(), session_id, "logout request sent");
        Ok(())
    }

    /// Bring an IP address online under this account
    pub fn connect_ip(&self, account: &Account, ip: &str) -> Result<()> {
        let session = self.login(account)?;
        let reply = session.connect_ip(ip)?;
        if !reply.contains(CONNECT_ACCEPTED) {
            return Err(Error::portal(format!("Failed to connect {}: {}", ip, reply)));
        }
        info!(username = account.username(), ip, "connect request sent");
        Ok(())
    }
}
