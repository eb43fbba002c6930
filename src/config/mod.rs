//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig::default()
//!     → loader.rs (optional TOML file)
//!     → loader.rs (environment overrides: JWT_SECRET, ENCRYPTION_KEY, DB_*)
//!     → validation.rs (semantic checks, missing secrets are fatal)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults except the secrets, which must be supplied
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AdmissionConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::SecurityConfig;
pub use schema::UpstreamConfig;
