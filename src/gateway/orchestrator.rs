//! Signin sequencing.
//!
//! ```text
//! client IP → admission check → bearer check → resolve credentials
//!           → upstream signin → seal credentials → response
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::config::{ConfigError, GatewayConfig, UpstreamConfig};
use crate::crypto::CipherKey;
use crate::gateway::credentials::{Credentials, SealedCredentials};
use crate::gateway::error::GatewayError;
use crate::observability::metrics;
use crate::security::{verify_bearer, AdmissionLimiter, AttemptError};
use crate::upstream::{SigninClient, SigninRequest};

/// Message returned on a successful signin.
pub const SUCCESS_MESSAGE: &str = "Autenticación exitosa";

/// Body of every signin response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponse {
    pub message: String,
    pub credentials: SealedCredentials,
}

/// Composes the admission limiter, bearer check, upstream client and cipher.
pub struct Gateway {
    limiter: Arc<AdmissionLimiter>,
    upstream: Arc<dyn SigninClient>,
    key: CipherKey,
    bearer_secret: String,
    defaults: UpstreamConfig,
}

impl Gateway {
    pub fn new(
        limiter: Arc<AdmissionLimiter>,
        upstream: Arc<dyn SigninClient>,
        key: CipherKey,
        bearer_secret: String,
        defaults: UpstreamConfig,
    ) -> Self {
        Self {
            limiter,
            upstream,
            key,
            bearer_secret,
            defaults,
        }
    }

    /// Build a gateway from validated configuration.
    pub fn from_config(
        config: &GatewayConfig,
        limiter: Arc<AdmissionLimiter>,
        upstream: Arc<dyn SigninClient>,
    ) -> Result<Self, ConfigError> {
        let key = CipherKey::parse(&config.security.encryption_key)?;
        Ok(Self::new(
            limiter,
            upstream,
            key,
            config.security.bearer_secret.clone(),
            config.upstream.clone(),
        ))
    }

    pub fn limiter(&self) -> &Arc<AdmissionLimiter> {
        &self.limiter
    }

    /// Run one signin request for `client_id`.
    pub async fn sign_in(
        &self,
        client_id: &str,
        authorization: Option<&str>,
        request: SigninRequest,
    ) -> Result<SigninResponse, GatewayError> {
        self.authorize(client_id, authorization)?;
        self.exchange(client_id, request).await
    }

    /// Admission check followed by bearer verification.
    ///
    /// Both run under one limiter lock, so a bearer failure is counted
    /// before the next request from the same client is admitted. A success
    /// clears the client's failure budget.
    pub fn authorize(&self, client_id: &str, authorization: Option<&str>) -> Result<(), GatewayError> {
        self.limiter
            .attempt(client_id, || verify_bearer(authorization, &self.bearer_secret))
            .map_err(|e| match e {
                AttemptError::Denied(reason) => {
                    tracing::warn!(client = %client_id, reason = reason.as_str(), "Admission denied");
                    metrics::record_admission_denied(reason.as_str());
                    GatewayError::RateLimited(reason)
                }
                AttemptError::Rejected(failure) => {
                    tracing::warn!(client = %client_id, reason = failure.as_str(), "Bearer authentication failed");
                    metrics::record_auth_failure(failure.as_str());
                    GatewayError::Unauthorized(failure)
                }
            })
    }

    /// Exchange credentials for a token and seal the result. Callers must
    /// have passed [`authorize`](Self::authorize) first.
    pub async fn exchange(
        &self,
        client_id: &str,
        request: SigninRequest,
    ) -> Result<SigninResponse, GatewayError> {
        let request = self.resolve(request)?;

        let token = self.upstream.sign_in(&request).await.map_err(|e| {
            tracing::error!(client = %client_id, error = %e, "Upstream signin failed");
            metrics::record_upstream_error(e.kind());
            GatewayError::from(e)
        })?;

        let credentials = Credentials {
            host: self.defaults.host.clone(),
            port: self.defaults.port.clone(),
            user: request.user,
            pass: request.pass,
            ns: request.ns,
            db: request.db,
            protocol: self.defaults.protocol.clone(),
            token,
        };
        let sealed = credentials.seal(&self.key).map_err(|e| {
            tracing::error!(client = %client_id, error = %e, "Sealing credentials failed");
            GatewayError::from(e)
        })?;

        tracing::info!(client = %client_id, "Signin succeeded");
        Ok(SigninResponse {
            message: SUCCESS_MESSAGE.to_string(),
            credentials: sealed,
        })
    }

    /// Fill empty fields from the configured defaults and reject anything
    /// still empty. With `enforce_credentials`, a supplied value must also
    /// match its configured counterpart.
    fn resolve(&self, request: SigninRequest) -> Result<SigninRequest, GatewayError> {
        let pick = |given: String, fallback: &str| {
            if given.is_empty() {
                fallback.to_string()
            } else {
                given
            }
        };
        let resolved = SigninRequest {
            ns: pick(request.ns, &self.defaults.ns),
            db: pick(request.db, &self.defaults.db),
            user: pick(request.user, &self.defaults.user),
            pass: pick(request.pass, &self.defaults.pass),
        };

        for (name, value, configured) in [
            ("ns", &resolved.ns, &self.defaults.ns),
            ("db", &resolved.db, &self.defaults.db),
            ("user", &resolved.user, &self.defaults.user),
            ("pass", &resolved.pass, &self.defaults.pass),
        ] {
            if value.is_empty() {
                return Err(GatewayError::InvalidCredentials(name));
            }
            if self.defaults.enforce_credentials
                && !configured.is_empty()
                && !bool::from(value.as_bytes().ct_eq(configured.as_bytes()))
            {
                return Err(GatewayError::InvalidCredentials(name));
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdmissionConfig;
    use crate::security::{AuthFailure, DenyReason};
    use crate::upstream::UpstreamError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SECRET: &str = "s3cret";

    /// Upstream stub that records what it was sent.
    struct StubUpstream {
        calls: AtomicUsize,
        last: Mutex<Option<SigninRequest>>,
        reply: fn() -> Result<String, UpstreamError>,
    }

    impl StubUpstream {
        fn new(reply: fn() -> Result<String, UpstreamError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SigninClient for StubUpstream {
        async fn sign_in(&self, request: &SigninRequest) -> Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            (self.reply)()
        }
    }

    fn ok_token() -> Result<String, UpstreamError> {
        Ok("abc123".to_string())
    }

    fn gateway(upstream: Arc<StubUpstream>, defaults: UpstreamConfig) -> Gateway {
        Gateway::new(
            Arc::new(AdmissionLimiter::new(AdmissionConfig::default())),
            upstream,
            CipherKey::parse("0123456789abcdef0123456789abcdef").unwrap(),
            SECRET.to_string(),
            defaults,
        )
    }

    fn body() -> SigninRequest {
        SigninRequest {
            ns: "test".into(),
            db: "test".into(),
            user: "root".into(),
            pass: "root".into(),
        }
    }

    fn bearer() -> String {
        format!("Bearer {}", SECRET)
    }

    #[tokio::test]
    async fn test_successful_signin_encrypts_token() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), UpstreamConfig::default());

        let resp = gw.sign_in("1.2.3.4", Some(&bearer()), body()).await.unwrap();
        assert_eq!(resp.message, SUCCESS_MESSAGE);
        assert_ne!(resp.credentials.token(), "abc123");

        let opened = resp.credentials.open(&gw.key).unwrap();
        assert_eq!(opened.token, "abc123");
        assert_eq!(opened.user, "root");
        assert_eq!(opened.host, "localhost:8000");
        assert_eq!(opened.protocol, "https");
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_bad_headers_never_reach_upstream() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), UpstreamConfig::default());

        let cases = [
            (None, AuthFailure::Missing),
            (Some("s3cret"), AuthFailure::Malformed),
            (Some("Bearer wrong"), AuthFailure::Mismatch),
        ];
        for (i, (header, expected)) in cases.into_iter().enumerate() {
            let client = format!("10.0.0.{}", i);
            let err = gw.sign_in(&client, header, body()).await.unwrap_err();
            assert!(matches!(err, GatewayError::Unauthorized(f) if f == expected));
            assert_eq!(gw.limiter().snapshot(&client).unwrap().failed_attempts, 1);
        }
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_auth_failures_lock_client_out() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), UpstreamConfig::default());

        for _ in 0..3 {
            let err = gw.sign_in("c", Some("Bearer wrong"), body()).await.unwrap_err();
            assert!(matches!(err, GatewayError::Unauthorized(_)));
        }
        let err = gw.sign_in("c", Some(&bearer()), body()).await.unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited(DenyReason::Lockout)));
        assert_eq!(upstream.calls(), 0);

        gw.limiter().reset_failures("c");
        assert!(gw.sign_in("c", Some(&bearer()), body()).await.is_ok());
    }

    #[tokio::test]
    async fn test_success_clears_earlier_failures() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream, UpstreamConfig::default());

        let _ = gw.sign_in("c", Some("Bearer wrong"), body()).await;
        assert_eq!(gw.limiter().snapshot("c").unwrap().failed_attempts, 1);
        gw.sign_in("c", Some(&bearer()), body()).await.unwrap();
        assert_eq!(gw.limiter().snapshot("c").unwrap().failed_attempts, 0);
    }

    fn configured() -> UpstreamConfig {
        let mut defaults = UpstreamConfig::default();
        defaults.ns = "prod".into();
        defaults.db = "main".into();
        defaults.user = "svc".into();
        defaults.pass = "svcpass".into();
        defaults
    }

    #[tokio::test]
    async fn test_empty_fields_fall_back_to_defaults() {
        let upstream = StubUpstream::new(ok_token);
        let mut defaults = configured();
        defaults.enforce_credentials = false;
        let gw = gateway(upstream.clone(), defaults);

        let partial = SigninRequest {
            user: "alice".into(),
            pass: "pw".into(),
            ..Default::default()
        };
        gw.sign_in("c", Some(&bearer()), partial).await.unwrap();

        let sent = upstream.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.ns, "prod");
        assert_eq!(sent.db, "main");
        assert_eq!(sent.user, "alice");
        assert_eq!(sent.pass, "pw");
    }

    #[tokio::test]
    async fn test_mismatched_credentials_rejected_before_upstream() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), configured());

        let foreign = SigninRequest {
            ns: "other".into(),
            db: "x".into(),
            user: "attacker".into(),
            pass: "guess".into(),
        };
        let err = gw.sign_in("c", Some(&bearer()), foreign).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials("ns")));

        let wrong_pass = SigninRequest {
            pass: "guess".into(),
            ..Default::default()
        };
        let err = gw.sign_in("c", Some(&bearer()), wrong_pass).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials("pass")));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_matching_or_blank_credentials_pass_enforcement() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), configured());

        let exact = SigninRequest {
            ns: "prod".into(),
            db: "main".into(),
            user: "svc".into(),
            pass: "svcpass".into(),
        };
        gw.sign_in("c", Some(&bearer()), exact.clone()).await.unwrap();
        gw.sign_in("c", Some(&bearer()), SigninRequest::default()).await.unwrap();

        assert_eq!(upstream.calls(), 2);
        assert_eq!(upstream.last.lock().unwrap().clone().unwrap(), exact);
    }

    #[tokio::test]
    async fn test_unconfigured_fields_are_not_enforced() {
        let upstream = StubUpstream::new(ok_token);
        let mut defaults = UpstreamConfig::default();
        defaults.ns = "prod".into();
        let gw = gateway(upstream.clone(), defaults);

        let request = SigninRequest {
            ns: "prod".into(),
            ..body()
        };
        gw.sign_in("c", Some(&bearer()), request).await.unwrap();
        assert_eq!(upstream.last.lock().unwrap().clone().unwrap().user, "root");
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected_before_upstream() {
        let upstream = StubUpstream::new(ok_token);
        let gw = gateway(upstream.clone(), UpstreamConfig::default());

        let err = gw
            .sign_in("c", Some(&bearer()), SigninRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials("ns")));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried() {
        let upstream = StubUpstream::new(|| Err(UpstreamError::Status(503)));
        let gw = gateway(upstream.clone(), UpstreamConfig::default());

        let err = gw.sign_in("c", Some(&bearer()), body()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream(UpstreamError::Status(503))));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_volume_limit_applies_to_signin() {
        let upstream = StubUpstream::new(ok_token);
        let mut config = AdmissionConfig::default();
        config.max_requests_per_minute = 2;
        let gw = Gateway::new(
            Arc::new(AdmissionLimiter::new(config)),
            upstream.clone(),
            CipherKey::generate(),
            SECRET.to_string(),
            UpstreamConfig::default(),
        );

        assert!(gw.sign_in("c", Some(&bearer()), body()).await.is_ok());
        assert!(gw.sign_in("c", Some(&bearer()), body()).await.is_ok());
        let err = gw.sign_in("c", Some(&bearer()), body()).await.unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited(DenyReason::Throttled)));
        assert_eq!(upstream.calls(), 2);
    }
}
