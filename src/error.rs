use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Validation and configuration failures, one stable kind per cause.
///
/// The message strings are part of the public contract: callers match on
/// them verbatim, so they live in the `#[error]` attributes rather than in
/// ad-hoc format strings at the failure sites.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deployment bug (missing or unparsable key material), never a
    /// client-input problem.
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Decode(String),
    #[error("The specified alg value is not allowed")]
    InvalidAlgorithm,
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("Signature has expired")]
    ExpiredSignature,
    #[error("Token is missing the \"{0}\" claim")]
    MissingClaim(&'static str),
    #[error("Invalid issuer")]
    InvalidIssuer,
    #[error("Audience doesn't match")]
    InvalidAudience,
    #[error("{0}")]
    WrongToken(&'static str),
    #[error("Fresh token required")]
    FreshTokenRequired,
    #[error("Token has been revoked")]
    RevokedToken,
}

impl AuthError {
    /// HTTP status the failure maps to: 401 for expiry-class rejections,
    /// 422 for structural/signature/claim mismatches, 500 for
    /// configuration faults.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::ExpiredSignature
            | AuthError::FreshTokenRequired
            | AuthError::RevokedToken => StatusCode::UNAUTHORIZED,
            AuthError::Decode(_)
            | AuthError::InvalidAlgorithm
            | AuthError::InvalidSignature
            | AuthError::MissingClaim(_)
            | AuthError::InvalidIssuer
            | AuthError::InvalidAudience
            | AuthError::WrongToken(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::ExpiredSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::InvalidAlgorithm
            }
            ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning
            | ErrorKind::InvalidKeyFormat => AuthError::Configuration(err.to_string()),
            _ => AuthError::Decode(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            AuthError::Decode("Not enough segments".to_string()).to_string(),
            "Not enough segments"
        );
        assert_eq!(
            AuthError::InvalidAlgorithm.to_string(),
            "The specified alg value is not allowed"
        );
        assert_eq!(
            AuthError::InvalidSignature.to_string(),
            "Signature verification failed"
        );
        assert_eq!(
            AuthError::ExpiredSignature.to_string(),
            "Signature has expired"
        );
        assert_eq!(
            AuthError::MissingClaim("iss").to_string(),
            "Token is missing the \"iss\" claim"
        );
        assert_eq!(AuthError::InvalidIssuer.to_string(), "Invalid issuer");
        assert_eq!(
            AuthError::InvalidAudience.to_string(),
            "Audience doesn't match"
        );
        assert_eq!(
            AuthError::RevokedToken.to_string(),
            "Token has been revoked"
        );
        assert_eq!(
            AuthError::FreshTokenRequired.to_string(),
            "Fresh token required"
        );
    }

    #[test]
    fn expiry_class_maps_to_401() {
        assert_eq!(
            AuthError::ExpiredSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::FreshTokenRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::RevokedToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn validation_class_maps_to_422() {
        assert_eq!(
            AuthError::Decode("Not enough segments".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::InvalidAlgorithm.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::InvalidSignature.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::MissingClaim("aud").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::WrongToken("Only access tokens are allowed").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn configuration_fault_maps_to_500() {
        assert_eq!(
            AuthError::Configuration("secret_key unset".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
