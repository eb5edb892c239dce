//! Core domain entities
//!
//! Plain data structures with validation logic - no I/O.

mod account;
pub mod check;
pub mod credential;
pub mod result;

pub use account::{Account, AccountInfo};
pub use check::{CheckOutcome, LoginOutcome, OnlineSession};
pub use credential::CredentialDigest;
