//! Bearer secret verification.

use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// Why an `Authorization` header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No header supplied.
    Missing,
    /// Header present but not of the form `Bearer <secret>`.
    Malformed,
    /// Secret does not match.
    Mismatch,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing",
            AuthFailure::Malformed => "malformed",
            AuthFailure::Mismatch => "mismatch",
        }
    }
}

/// Check an `Authorization` header value against the shared secret.
///
/// The comparison of secrets is constant-time in the secret's content.
pub fn verify_bearer(header: Option<&str>, expected_secret: &str) -> Result<(), AuthFailure> {
    let value = match header {
        Some(v) if !v.is_empty() => v,
        _ => return Err(AuthFailure::Missing),
    };

    let presented = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthFailure::Malformed)?;

    if expected_secret.is_empty() {
        return Err(AuthFailure::Mismatch);
    }

    if bool::from(presented.as_bytes().ct_eq(expected_secret.as_bytes())) {
        Ok(())
    } else {
        Err(AuthFailure::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bearer() {
        assert_eq!(verify_bearer(Some("Bearer s3cret"), "s3cret"), Ok(()));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(verify_bearer(None, "s3cret"), Err(AuthFailure::Missing));
        assert_eq!(verify_bearer(Some(""), "s3cret"), Err(AuthFailure::Missing));
    }

    #[test]
    fn test_malformed_header() {
        assert_eq!(verify_bearer(Some("s3cret"), "s3cret"), Err(AuthFailure::Malformed));
        assert_eq!(verify_bearer(Some("Basic s3cret"), "s3cret"), Err(AuthFailure::Malformed));
        assert_eq!(verify_bearer(Some("bearer s3cret"), "s3cret"), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_wrong_secret() {
        assert_eq!(verify_bearer(Some("Bearer nope"), "s3cret"), Err(AuthFailure::Mismatch));
        assert_eq!(verify_bearer(Some("Bearer s3cret "), "s3cret"), Err(AuthFailure::Mismatch));
        assert_eq!(verify_bearer(Some("Bearer "), "s3cret"), Err(AuthFailure::Mismatch));
    }

    #[test]
    fn test_empty_expected_secret_never_matches() {
        assert_eq!(verify_bearer(Some("Bearer "), ""), Err(AuthFailure::Mismatch));
    }
}
