//! Credential records and their encrypted form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{CipherError, CipherKey};

/// Connection details and token for one upstream session, in cleartext.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub host: String,
    pub port: String,
    pub user: String,
    pub pass: String,
    pub ns: String,
    pub db: String,
    pub protocol: String,
    pub token: String,
}

impl Credentials {
    /// Encrypt every field under `key`.
    ///
    /// Consumes the cleartext record; on error nothing partially encrypted is
    /// returned.
    pub fn seal(self, key: &CipherKey) -> Result<SealedCredentials, CipherError> {
        Ok(SealedCredentials(Credentials {
            host: key.encrypt(&self.host)?,
            port: key.encrypt(&self.port)?,
            user: key.encrypt(&self.user)?,
            pass: key.encrypt(&self.pass)?,
            ns: key.encrypt(&self.ns)?,
            db: key.encrypt(&self.db)?,
            protocol: key.encrypt(&self.protocol)?,
            token: key.encrypt(&self.token)?,
        }))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .field("ns", &self.ns)
            .field("db", &self.db)
            .field("protocol", &self.protocol)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// A [`Credentials`] record whose every field is a base64 ciphertext.
///
/// The only ways to obtain one are [`Credentials::seal`], deserializing a
/// response, or [`SealedCredentials::empty`] for denials that carry no data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedCredentials(Credentials);

impl SealedCredentials {
    /// Record with every field empty, used in denial responses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == Credentials::default()
    }

    /// Encrypted token.
    pub fn token(&self) -> &str {
        &self.0.token
    }

    /// Access the ciphertext fields.
    pub fn fields(&self) -> &Credentials {
        &self.0
    }

    /// Decrypt every field under `key`.
    pub fn open(&self, key: &CipherKey) -> Result<Credentials, CipherError> {
        let c = &self.0;
        Ok(Credentials {
            host: key.decrypt(&c.host)?,
            port: key.decrypt(&c.port)?,
            user: key.decrypt(&c.user)?,
            pass: key.decrypt(&c.pass)?,
            ns: key.decrypt(&c.ns)?,
            db: key.decrypt(&c.db)?,
            protocol: key.decrypt(&c.protocol)?,
            token: key.decrypt(&c.token)?,
        })
    }
}
