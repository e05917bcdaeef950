use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::claims::{Audience, TokenType};

/// Token lifetime: a fixed duration past issuance, or no time limit at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No `exp` claim is set; the token never expires by time.
    Never,
    After(Duration),
}

/// True for the HMAC family, which signs and verifies with the shared
/// `secret_key` instead of a private/public pair.
pub fn is_symmetric(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Immutable trust parameters for token issuance and validation.
///
/// Resolved once per logical load via [`AuthConfig::builder`]; any
/// reconfiguration produces a wholly new record. Key material requirements
/// are deliberately not checked at build time: a decode-only consumer may
/// hold a public key and never need a secret, so each missing key is
/// reported at the first encode/decode call that actually needs it.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signing algorithm used at encode time.
    pub algorithm: Algorithm,
    /// Shared secret for the HMAC family.
    pub secret_key: Option<String>,
    /// PEM-encoded private key for asymmetric encode.
    pub private_key: Option<String>,
    /// PEM-encoded public key for asymmetric decode.
    pub public_key: Option<String>,
    /// Explicit decode-time allow-list; defaults to `[algorithm]`.
    pub decode_algorithms: Option<Vec<Algorithm>>,
    pub access_token_expires: Expiry,
    pub refresh_token_expires: Expiry,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub decode_leeway: u32,
    /// Expected audience; unset means the audience check is skipped.
    pub decode_audience: Option<Audience>,
    /// Issuer embedded at encode time unless overridden per call.
    pub encode_issuer: Option<String>,
    /// Issuer required at decode time; unset means no issuer check.
    pub decode_issuer: Option<String>,
    /// Switch for the external denylist callback hook.
    pub denylist_enabled: bool,
    /// Token classes the denylist hook is consulted for.
    pub denylist_token_checks: Vec<TokenType>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            secret_key: None,
            private_key: None,
            public_key: None,
            decode_algorithms: None,
            access_token_expires: Expiry::After(Duration::minutes(15)),
            refresh_token_expires: Expiry::After(Duration::days(30)),
            decode_leeway: 0,
            decode_audience: None,
            encode_issuer: None,
            decode_issuer: None,
            denylist_enabled: false,
            denylist_token_checks: vec![TokenType::Access, TokenType::Refresh],
        }
    }
}

impl AuthConfig {
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }

    /// Algorithms accepted at decode time.
    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        match &self.decode_algorithms {
            Some(algorithms) => algorithms,
            None => std::slice::from_ref(&self.algorithm),
        }
    }

    pub fn expires_for(&self, token_type: TokenType) -> Expiry {
        match token_type {
            TokenType::Access => self.access_token_expires,
            TokenType::Refresh => self.refresh_token_expires,
        }
    }
}

#[derive(Debug, Default)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    fn new() -> Self {
        Self {
            config: AuthConfig::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.config.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.config.private_key = Some(pem.into());
        self
    }

    pub fn with_public_key(mut self, pem: impl Into<String>) -> Self {
        self.config.public_key = Some(pem.into());
        self
    }

    pub fn with_decode_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.config.decode_algorithms = Some(algorithms);
        self
    }

    pub fn with_access_token_expires(mut self, expires: Expiry) -> Self {
        self.config.access_token_expires = expires;
        self
    }

    pub fn with_refresh_token_expires(mut self, expires: Expiry) -> Self {
        self.config.refresh_token_expires = expires;
        self
    }

    pub fn with_decode_leeway(mut self, seconds: u32) -> Self {
        self.config.decode_leeway = seconds;
        self
    }

    pub fn with_decode_audience(mut self, audience: impl Into<Audience>) -> Self {
        self.config.decode_audience = Some(audience.into());
        self
    }

    pub fn with_encode_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.config.encode_issuer = Some(issuer.into());
        self
    }

    pub fn with_decode_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.config.decode_issuer = Some(issuer.into());
        self
    }

    pub fn with_denylist_enabled(mut self, enabled: bool) -> Self {
        self.config.denylist_enabled = enabled;
        self
    }

    pub fn with_denylist_token_checks(mut self, token_types: Vec<TokenType>) -> Self {
        self.config.denylist_token_checks = token_types;
        self
    }

    pub fn build(self) -> AuthConfig {
        self.config
    }
}
