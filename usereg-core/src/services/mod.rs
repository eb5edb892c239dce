//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

mod checker;
pub mod extract;
mod sessions;

pub use checker::{AccountChecker, ExtractionFailure};
pub use sessions::{SessionService, CONNECT_ACCEPTED, DROP_ACCEPTED};
