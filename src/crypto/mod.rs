//! Credential encryption subsystem.
//!
//! # Data Flow
//! ```text
//! ENCRYPTION_KEY (config)
//!     → key.rs (parse raw / base64, enforce 32 bytes)
//!     → CipherKey (zeroized on drop, shared via Arc)
//!
//! plaintext field
//!     → cipher.rs encrypt (random IV, PKCS#7, AES-256-CBC)
//!     → base64(IV ‖ ciphertext)
//! ```
//!
//! # Design Decisions
//! - One uniform `InvalidCiphertext` error for every malformed input
//! - Key length validated once at startup, re-checked on the free functions
//! - Engine is stateless; safe to call from any task

pub mod cipher;
pub mod key;

pub use cipher::{decrypt, encrypt, CipherError, BLOCK_SIZE, KEY_SIZE};
pub use key::CipherKey;
