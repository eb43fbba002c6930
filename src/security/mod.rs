//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming signin request:
//!     → admission.rs (per-IP volume and failure limits)
//!     → auth.rs (Authorization: Bearer <secret>)
//!     → Pass to gateway orchestrator
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Authentication failures feed back into admission (lockout)
//! - No trust in client input

pub mod admission;
pub mod auth;

pub use admission::{AdmissionDecision, AdmissionLimiter, AttemptError, ClientSnapshot, DenyReason};
pub use auth::{verify_bearer, AuthFailure};
