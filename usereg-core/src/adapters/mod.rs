//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - usereg HTTP client (blocking reqwest + cookie jar) for the Portal port
//! - Mock portal server for testing

pub mod usereg;

#[cfg(test)]
pub mod usereg_mock;
