use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entities::{Role, User};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::timestamps::format_rfc3339;

const LEEWAY_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Username.
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub token_type: String,
    pub expires_at: String,
}

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiration: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str, issuer: &str, audience: &str, expiration_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiration: Duration::minutes(expiration_minutes),
        }
    }

    pub fn issue(&self, user: &User, roles: &[Role]) -> ApiResult<AccessToken> {
        self.issue_at(user, roles, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user: &User, roles: &[Role], now: OffsetDateTime) -> ApiResult<AccessToken> {
        let expires_at = now + self.expiration;
        let claims = Claims {
            sub: user.id.clone(),
            name: user.username.clone(),
            email: user.email.clone(),
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign access token: {}", e)))?;

        Ok(AccessToken {
            token,
            token_type: "Bearer".to_string(),
            expires_at: format_rfc3339(expires_at),
        })
    }

    /// Verifies signature, issuer, audience and expiry.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = LEEWAY_SECONDS;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
