//! usereg portal HTTP client
//!
//! Talks to the portal's PHP endpoints with a blocking reqwest client that
//! keeps its own cookie jar, so the login cookie set by `do.php` is sent along
//! with every later page request made through the same client.

use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::config::PortalConfig;
use crate::domain::check::LoginOutcome;
use crate::domain::credential::CredentialDigest;
use crate::domain::result::{Error, Result};
use crate::ports::{Portal, PortalConnector};

const LOGIN_PATH: &str = "do.php";
const INFO_PATH: &str = "user_info.php";
const SESSIONS_PATH: &str = "online_user_ipv4.php";
const IP_LOGIN_PATH: &str = "ip_login.php";

/// Pages without a declared charset are GB-encoded
const DEFAULT_CHARSET: &str = "gb18030";

/// One portal session backed by a cookie-carrying HTTP client
#[derive(Debug)]
pub struct UseregClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl UseregClient {
    /// Create a client with an empty cookie jar
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.read_body(response)
    }

    fn get_page(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.read_body(response)
    }

    /// Reject error statuses and decode the body
    fn read_body(&self, response: Response) -> Result<String> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::portal(format!("HTTP {}", status.as_u16())));
        }

        response
            .text_with_charset(DEFAULT_CHARSET)
            .map_err(|e| self.map_request_error(e))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Transport(format!("Connection timed out after {} seconds", self.timeout_secs))
        } else if error.is_connect() {
            Error::Transport("Unable to connect to the usereg portal".to_string())
        } else {
            Error::Transport(format!("usereg request failed: {}", error))
        }
    }
}

impl Portal for UseregClient {
    fn login(&self, username: &str, credential: &CredentialDigest) -> Result<LoginOutcome> {
        let body = self.post_form(
            LOGIN_PATH,
            &[
                ("action", "login"),
                ("user_login_name", username),
                ("user_password", credential.as_str()),
            ],
        )?;
        Ok(LoginOutcome::from_body(&body))
    }

    fn fetch_info_page(&self) -> Result<String> {
        self.get_page(INFO_PATH)
    }

    fn fetch_sessions_page(&self) -> Result<String> {
        self.get_page(SESSIONS_PATH)
    }

    fn drop_session(&self, session_id: &str) -> Result<String> {
        let user_ip = format!("{},", session_id);
        self.post_form(SESSIONS_PATH, &[("action", "drops"), ("user_ip", &user_ip)])
    }

    fn connect_ip(&self, ip: &str) -> Result<String> {
        self.post_form(
            IP_LOGIN_PATH,
            &[
                ("n", "100"),
                ("is_pad", "1"),
                ("type", "10"),
                ("action", "do_login"),
                ("drop", "0"),
                ("user_ip", ip),
            ],
        )
    }
}

/// Opens a new `UseregClient` (and cookie jar) for every operation
#[derive(Debug, Clone)]
pub struct UseregConnector {
    config: PortalConfig,
}

impl UseregConnector {
    pub fn new(config: PortalConfig) -> Self {
        Self { config }
    }
}

impl PortalConnector for UseregConnector {
    type Session = UseregClient;

    fn open(&self) -> Result<UseregClient> {
        UseregClient::new(&self.config)
    }
}
