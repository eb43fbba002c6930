//! Credential-brokering gateway library.
//!
//! Accepts a bearer secret and database credentials over HTTP, signs in to an
//! upstream database, and returns the connection record with every field
//! encrypted under AES-256-CBC.

pub mod config;
pub mod crypto;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
