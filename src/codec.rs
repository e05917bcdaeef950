use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode_header, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::claims::{Audience, Claims, TokenPair, TokenType};
use crate::config::{is_symmetric, AuthConfig, Expiry};
use crate::error::{AuthError, AuthResult};

/// External revocation hook: returns true when the presented token has been
/// revoked. Storage for the denylist lives entirely outside this crate.
pub type DenylistCheck = Arc<dyn Fn(&Claims) -> bool + Send + Sync>;

/// Claims that the codec owns at encode time. Callers supply everything else
/// through [`TokenOptions::claims`].
const RESERVED_CLAIMS: &[&str] = &[
    "sub", "jti", "type", "fresh", "exp", "iat", "nbf", "aud", "iss",
];

/// Per-call issuance options.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    /// Marks an access token as issued from direct credential login.
    pub fresh: bool,
    /// Audience embedded as given, scalar or list, without normalization.
    pub audience: Option<Audience>,
    /// Overrides the configured lifetime for this token only.
    pub expires: Option<Expiry>,
    /// Overrides the configured encode issuer for this token only.
    pub issuer: Option<String>,
    /// Custom claims merged into the payload. Must not redefine a reserved
    /// claim; doing so is a caller bug and panics.
    pub claims: Map<String, Value>,
}

/// Signs claim sets into compact tokens and verifies them back, enforcing
/// every constraint carried by the [`AuthConfig`] it was built with.
///
/// Encode and decode are pure and stateless; reconfiguration means building
/// a new `JwtCodec` over a new config, so concurrent callers always observe
/// a fully-formed parameter set.
#[derive(Clone)]
pub struct JwtCodec {
    config: Arc<AuthConfig>,
    denylist_check: Option<DenylistCheck>,
}

impl JwtCodec {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self {
            config,
            denylist_check: None,
        }
    }

    pub fn with_denylist_check(mut self, check: DenylistCheck) -> Self {
        self.denylist_check = Some(check);
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issues an access token for `subject`.
    pub fn create_access_token(
        &self,
        subject: impl Into<Value>,
        options: &TokenOptions,
    ) -> AuthResult<String> {
        self.encode(subject.into(), TokenType::Access, options)
    }

    /// Issues a refresh token for `subject`. The `fresh` option is ignored;
    /// only access tokens carry the claim.
    pub fn create_refresh_token(
        &self,
        subject: impl Into<Value>,
        options: &TokenOptions,
    ) -> AuthResult<String> {
        self.encode(subject.into(), TokenType::Refresh, options)
    }

    /// Issues an access/refresh pair sharing subject and audience.
    pub fn create_pair_token(
        &self,
        subject: impl Into<Value>,
        options: &TokenOptions,
    ) -> AuthResult<TokenPair> {
        let subject = subject.into();
        Ok(TokenPair {
            access_token: self.encode(subject.clone(), TokenType::Access, options)?,
            refresh_token: self.encode(subject, TokenType::Refresh, options)?,
        })
    }

    fn encode(
        &self,
        subject: Value,
        token_type: TokenType,
        options: &TokenOptions,
    ) -> AuthResult<String> {
        for reserved in RESERVED_CLAIMS {
            if options.claims.contains_key(*reserved) {
                panic!("custom claim '{reserved}' collides with a reserved claim");
            }
        }

        let now = Utc::now().timestamp();
        let expires = options
            .expires
            .unwrap_or_else(|| self.config.expires_for(token_type));
        let exp = match expires {
            Expiry::Never => None,
            Expiry::After(duration) => Some(now + duration.num_seconds()),
        };
        let iss = options
            .issuer
            .clone()
            .or_else(|| self.config.encode_issuer.clone());
        let fresh = match token_type {
            TokenType::Access => Some(options.fresh),
            TokenType::Refresh => None,
        };

        let claims = Claims {
            sub: Some(subject),
            jti: Some(Uuid::new_v4().to_string()),
            token_type: Some(token_type),
            fresh,
            exp,
            iat: Some(now),
            nbf: Some(now),
            aud: options.audience.clone(),
            iss,
            extra: options.claims.clone(),
        };

        let header = Header::new(self.config.algorithm);
        let key = self.encoding_key()?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    /// Verifies `token` and returns its full claim set.
    ///
    /// The pipeline is ordered and fail-fast; the first violated stage is
    /// the single reported error: segments, algorithm allow-list, signature,
    /// exp/nbf with leeway, issuer, audience, then the denylist hook.
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        if token.split('.').count() != 3 {
            return Err(AuthError::Decode("Not enough segments".to_string()));
        }

        let header = decode_header(token).map_err(|err| AuthError::Decode(err.to_string()))?;
        if !self.config.allowed_algorithms().contains(&header.alg) {
            return Err(AuthError::InvalidAlgorithm);
        }

        let key = self.decoding_key(header.alg)?;
        let mut validation = Validation::new(header.alg);
        validation.leeway = self.config.decode_leeway.into();
        validation.validate_nbf = true;
        // Issuer and audience are checked below so the pipeline order and
        // the per-claim error kinds stay under this crate's control.
        validation.validate_aud = false;
        // `exp` stays optional: never-expiring tokens carry no exp claim.
        validation.set_required_spec_claims::<&str>(&[]);

        let data = jsonwebtoken::decode::<Claims>(token, &key, &validation)?;
        let claims = data.claims;

        if let Some(expected) = &self.config.decode_issuer {
            match &claims.iss {
                None => return Err(AuthError::MissingClaim("iss")),
                Some(issuer) if issuer != expected => return Err(AuthError::InvalidIssuer),
                Some(_) => {}
            }
        }

        if let Some(expected) = &self.config.decode_audience {
            match &claims.aud {
                None => return Err(AuthError::MissingClaim("aud")),
                Some(audience) if !expected.intersects(audience) => {
                    return Err(AuthError::InvalidAudience)
                }
                Some(_) => {}
            }
        }

        if self.config.denylist_enabled {
            if let (Some(check), Some(token_type)) = (&self.denylist_check, claims.token_type) {
                if self.config.denylist_token_checks.contains(&token_type) && check(&claims) {
                    return Err(AuthError::RevokedToken);
                }
            }
        }

        debug!(token_type = ?claims.token_type, "verified bearer token");
        Ok(claims)
    }

    /// Full claim set of a verified token; decode failures propagate.
    pub fn get_raw_jwt(&self, token: &str) -> AuthResult<Claims> {
        self.decode(token)
    }

    pub fn get_jwt_subject(&self, token: &str) -> AuthResult<Option<Value>> {
        Ok(self.decode(token)?.sub)
    }

    pub fn get_jti(&self, token: &str) -> AuthResult<Option<String>> {
        Ok(self.decode(token)?.jti)
    }

    /// Verifies `token` and asserts it is an access token.
    pub fn jwt_required(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.decode(token)?;
        match claims.token_type {
            Some(TokenType::Access) => Ok(claims),
            Some(TokenType::Refresh) => {
                Err(AuthError::WrongToken("Only access tokens are allowed"))
            }
            None => Err(AuthError::MissingClaim("type")),
        }
    }

    /// Verifies `token` and asserts it is a refresh token.
    pub fn jwt_refresh_token_required(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.decode(token)?;
        match claims.token_type {
            Some(TokenType::Refresh) => Ok(claims),
            Some(TokenType::Access) => {
                Err(AuthError::WrongToken("Only refresh tokens are allowed"))
            }
            None => Err(AuthError::MissingClaim("type")),
        }
    }

    /// Verifies `token` and asserts it is a fresh access token, gating
    /// operations that require a direct credential login.
    pub fn fresh_jwt_required(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.jwt_required(token)?;
        if claims.fresh == Some(true) {
            Ok(claims)
        } else {
            Err(AuthError::FreshTokenRequired)
        }
    }

    /// Access-token guard for endpoints that work with or without a token.
    /// A present token must still fully validate.
    pub fn jwt_optional(&self, token: Option<&str>) -> AuthResult<Option<Claims>> {
        match token {
            Some(token) => self.jwt_required(token).map(Some),
            None => Ok(None),
        }
    }

    fn encoding_key(&self) -> AuthResult<EncodingKey> {
        let algorithm = self.config.algorithm;
        if is_symmetric(algorithm) {
            let secret = self.config.secret_key.as_deref().ok_or_else(|| {
                AuthError::Configuration(format!(
                    "secret_key must be set to encode {algorithm:?} tokens"
                ))
            })?;
            return Ok(EncodingKey::from_secret(secret.as_bytes()));
        }

        let pem = self.config.private_key.as_deref().ok_or_else(|| {
            AuthError::Configuration(format!(
                "private_key must be set to encode {algorithm:?} tokens"
            ))
        })?;
        let key = match algorithm {
            Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem.as_bytes()),
            Algorithm::EdDSA => EncodingKey::from_ed_pem(pem.as_bytes()),
            _ => EncodingKey::from_rsa_pem(pem.as_bytes()),
        }
        .map_err(|err| AuthError::Configuration(format!("failed to parse private_key: {err}")))?;
        Ok(key)
    }

    fn decoding_key(&self, algorithm: Algorithm) -> AuthResult<DecodingKey> {
        if is_symmetric(algorithm) {
            let secret = self.config.secret_key.as_deref().ok_or_else(|| {
                AuthError::Configuration(format!(
                    "secret_key must be set to decode {algorithm:?} tokens"
                ))
            })?;
            return Ok(DecodingKey::from_secret(secret.as_bytes()));
        }

        let pem = self.config.public_key.as_deref().ok_or_else(|| {
            AuthError::Configuration(format!(
                "public_key must be set to decode {algorithm:?} tokens"
            ))
        })?;
        let key = match algorithm {
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes()),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
            _ => DecodingKey::from_rsa_pem(pem.as_bytes()),
        }
        .map_err(|err| AuthError::Configuration(format!("failed to parse public_key: {err}")))?;
        Ok(key)
    }
}
