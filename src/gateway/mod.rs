//! Gateway orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! POST /signin (http layer)
//!     → orchestrator.rs (admission → bearer → upstream → seal)
//!     → credentials.rs (Credentials → SealedCredentials)
//!     → SigninResponse / GatewayError back to the http layer
//! ```
//!
//! # Design Decisions
//! - Pure composition; no retries
//! - Limiter lock is released before the upstream call
//! - Plaintext tokens and passwords never reach a log line

pub mod credentials;
pub mod error;
pub mod orchestrator;

pub use credentials::{Credentials, SealedCredentials};
pub use error::GatewayError;
pub use orchestrator::{Gateway, SigninResponse, SUCCESS_MESSAGE};
