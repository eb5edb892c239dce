//! usereg core - account checks against the campus usereg portal
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Account, CredentialDigest, CheckOutcome)
//! - **ports**: Trait definitions for external dependencies (Portal)
//! - **services**: Business logic orchestration (AccountChecker, SessionService)
//! - **adapters**: Concrete implementations (usereg HTTP client)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;

use anyhow::Result;

use config::Config;
use services::{AccountChecker, SessionService};

// Re-export commonly used types at crate root
pub use domain::{
    Account, AccountInfo, CheckOutcome, CredentialDigest, LoginOutcome, OnlineSession,
};
pub use domain::result::{Error, OperationResult};
pub use services::ExtractionFailure;

/// Main context for usereg operations
///
/// Holds the loaded configuration and the services built from it.
pub struct UseregContext {
    pub config: Config,
    pub checker: AccountChecker,
    pub session_service: SessionService,
}

impl UseregContext {
    /// Create a new context from the usereg directory
    pub fn new(usereg_dir: &Path) -> Result<Self> {
        let config = Config::load(usereg_dir)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let portal = config.portal()?;

        let checker = AccountChecker::new(portal.clone());
        let session_service = SessionService::new(portal);

        Ok(Self {
            config,
            checker,
            session_service,
        })
    }

    /// Rebuild the checker with another extraction failure mode
    pub fn with_extraction_failure(mut self, mode: ExtractionFailure) -> Self {
        self.checker = self.checker.on_extraction_failure(mode);
        self
    }
}
