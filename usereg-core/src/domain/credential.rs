//! Portal credential digests
//!
//! The portal never sees a plaintext password: the login form carries the
//! MD5 of the password as 32 lowercase hex characters.

use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Length of a rendered digest
pub const DIGEST_LEN: usize = 32;

/// A password digest as submitted to the login endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    /// Derive the digest from a plaintext password
    pub fn from_password(password: &str) -> Self {
        let hash = Md5::digest(password.as_bytes());
        Self(hex::encode(hash))
    }

    /// Accept a pre-computed digest verbatim.
    ///
    /// Only the length is checked; the content is trusted as-is.
    pub fn from_digest(digest: impl Into<String>) -> Result<Self> {
        let digest = digest.into();
        let length = digest.chars().count();
        if length != DIGEST_LEN {
            return Err(Error::InvalidCredentialFormat { length });
        }
        Ok(Self(digest))
    }

    /// Build from either form
    pub fn new(password: &str, is_digest: bool) -> Result<Self> {
        if is_digest {
            Self::from_digest(password)
        } else {
            Ok(Self::from_password(password))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep digests out of logs and panics.
impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialDigest(..)")
    }
}
