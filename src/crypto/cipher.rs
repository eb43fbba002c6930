//! AES-256-CBC string encryption with PKCS#7 padding.
//!
//! Output format is `base64(IV ‖ ciphertext)` using the standard alphabet.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Required key length for AES-256.
pub const KEY_SIZE: usize = 32;

/// AES block length, also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Errors produced by the cipher engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Key is not exactly 32 bytes.
    #[error("Encryption key must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// A `base64:` key whose payload is not valid base64.
    #[error("Encryption key is not valid base64")]
    InvalidKeyEncoding,

    /// Ciphertext could not be decoded, decrypted or unpadded.
    #[error("Invalid ciphertext")]
    InvalidCiphertext,
}

fn check_key(key: &[u8]) -> Result<(), CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`.
///
/// A fresh random IV is drawn for every call, so two encryptions of the same
/// input never produce the same output.
pub fn encrypt(plaintext: &str, key: &[u8]) -> Result<String, CipherError> {
    check_key(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);

    let encryptor = Aes256CbcEnc::new_from_slices(key, &iv).map_err(|_| {
        CipherError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        }
    })?;
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut combined = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(combined))
}

/// Decrypt a value produced by [`encrypt`].
///
/// Every decoding, length, padding and UTF-8 failure maps to
/// [`CipherError::InvalidCiphertext`].
pub fn decrypt(ciphertext: &str, key: &[u8]) -> Result<String, CipherError> {
    check_key(key)?;

    let decoded = STANDARD
        .decode(ciphertext)
        .map_err(|_| CipherError::InvalidCiphertext)?;

    if decoded.len() < BLOCK_SIZE {
        return Err(CipherError::InvalidCiphertext);
    }
    let (iv, body) = decoded.split_at(BLOCK_SIZE);
    if body.is_empty() || body.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::InvalidCiphertext);
    }

    let decryptor = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| {
        CipherError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        }
    })?;
    let mut plain = decryptor
        .decrypt_padded_vec_mut::<NoPadding>(body)
        .map_err(|_| CipherError::InvalidCiphertext)?;

    let unpadded_len = strip_pkcs7(&plain)?;
    plain.truncate(unpadded_len);

    String::from_utf8(plain).map_err(|_| CipherError::InvalidCiphertext)
}

/// Validate PKCS#7 padding and return the length of the message without it.
fn strip_pkcs7(block: &[u8]) -> Result<usize, CipherError> {
    let pad = match block.last() {
        Some(&b) => b as usize,
        None => return Err(CipherError::InvalidCiphertext),
    };
    if pad == 0 || pad > BLOCK_SIZE || pad > block.len() {
        return Err(CipherError::InvalidCiphertext);
    }

    let tail = &block[block.len() - pad..];
    let expected = [pad as u8; BLOCK_SIZE];
    if bool::from(tail.ct_eq(&expected[..pad])) {
        Ok(block.len() - pad)
    } else {
        Err(CipherError::InvalidCiphertext)
    }
}
