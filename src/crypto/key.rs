//! Validated encryption key.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::cipher::{self, CipherError, KEY_SIZE};

/// Prefix marking a base64-encoded key in configuration.
pub const BASE64_PREFIX: &str = "base64:";

/// A 32-byte AES-256 key. Zeroed on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    bytes: [u8; KEY_SIZE],
}

impl CipherKey {
    /// Build a key from raw bytes. Any length other than 32 is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CipherError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Parse a key as it appears in configuration.
    ///
    /// `base64:<data>` is decoded first; anything else is taken as the raw
    /// UTF-8 bytes of the string.
    pub fn parse(value: &str) -> Result<Self, CipherError> {
        match value.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => {
                let mut decoded = STANDARD
                    .decode(encoded.trim())
                    .map_err(|_| CipherError::InvalidKeyEncoding)?;
                let key = Self::from_bytes(&decoded);
                decoded.zeroize();
                key
            }
            None => Self::from_bytes(value.as_bytes()),
        }
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Encode as a `base64:` configuration value.
    pub fn to_config_string(&self) -> String {
        format!("{}{}", BASE64_PREFIX, STANDARD.encode(self.bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        cipher::encrypt(plaintext, &self.bytes)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        cipher::decrypt(ciphertext, &self.bytes)
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKey").field("bytes", &"[REDACTED]").finish()
    }
}
