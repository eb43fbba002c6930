//! Response mapping.
//!
//! Every outcome, success or failure, is a JSON `SigninResponse` with a
//! human-readable `message`. Failures carry an empty credentials record and a
//! status code chosen per error class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::gateway::{GatewayError, SealedCredentials, SigninResponse};
use crate::security::AuthFailure;

pub const MSG_RATE_LIMITED: &str = "Excediste el número de solicitudes permitidas. Intenta más tarde.";
pub const MSG_MISSING_KEY: &str = "No se proporcionó ninguna clave";
pub const MSG_MALFORMED_KEY: &str = "Formato de clave inválido";
pub const MSG_INVALID_KEY: &str = "Clave inválida";
pub const MSG_INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub const MSG_INVALID_BODY: &str = "Error al leer el cuerpo de la solicitud";
pub const MSG_UPSTREAM: &str = "Error al obtener el token";
pub const MSG_CIPHER: &str = "Error al encriptar las credenciales";

/// HTTP status for a gateway error.
pub fn status_for(error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        GatewayError::InvalidCredentials(_) | GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        GatewayError::Cipher(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Caller-facing message. Upstream and cipher details stay in the logs.
pub fn message_for(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::RateLimited(_) => MSG_RATE_LIMITED,
        GatewayError::Unauthorized(AuthFailure::Missing) => MSG_MISSING_KEY,
        GatewayError::Unauthorized(AuthFailure::Malformed) => MSG_MALFORMED_KEY,
        GatewayError::Unauthorized(AuthFailure::Mismatch) => MSG_INVALID_KEY,
        GatewayError::InvalidCredentials(_) => MSG_INVALID_CREDENTIALS,
        GatewayError::InvalidBody(_) => MSG_INVALID_BODY,
        GatewayError::Upstream(_) => MSG_UPSTREAM,
        GatewayError::Cipher(_) => MSG_CIPHER,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = SigninResponse {
            message: message_for(&self).to_string(),
            credentials: SealedCredentials::empty(),
        };
        (status_for(&self), Json(body)).into_response()
    }
}

impl IntoResponse for SigninResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
