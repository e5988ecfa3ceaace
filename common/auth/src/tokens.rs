use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Issues and verifies the signed session tokens presented on each request.
///
/// Tokens are stateless HS256 JWTs carrying `{sub, role, exp}`. Validity is
/// determined purely by signature and expiry at verification time; nothing is
/// persisted and nothing is revoked.
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

#[derive(Serialize)]
struct SessionClaims<'a> {
    sub: &'a str,
    role: &'a str,
    exp: i64,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue(&self, username: &str, role: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.ttl_seconds);

        let claims = SessionClaims {
            sub: username,
            role,
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
            expires_in: self.config.ttl_seconds,
            token_type: "bearer",
        })
    }

    /// Checks signature and expiry, returning the embedded identity verbatim.
    ///
    /// An expired-but-well-signed token surfaces as [`AuthError::Expired`];
    /// every other decode failure collapses into [`AuthError::InvalidToken`].
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);

        let token_data =
            decode::<Value>(token, &self.decoding_key, &validation).map_err(|err| {
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified session token");
        Ok(claims)
    }
}
