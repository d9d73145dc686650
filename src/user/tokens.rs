//! Signed access and refresh tokens.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_token_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime: Duration::minutes(access_token_minutes),
            refresh_lifetime: Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn issue_access(&self, user_id: i64) -> Result<IssuedToken> {
        self.issue(user_id, TokenType::Access, self.access_lifetime)
    }

    pub fn issue_refresh(&self, user_id: i64) -> Result<IssuedToken> {
        self.issue(user_id, TokenType::Refresh, self.refresh_lifetime)
    }

    fn issue(&self, user_id: i64, token_type: TokenType, lifetime: Duration) -> Result<IssuedToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")?;
        Ok(IssuedToken { token, claims })
    }

    /// Returns the claims when the signature is valid, the token is not
    /// expired and it has the expected type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Option<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation).ok()?;
        if data.claims.token_type != expected {
            return None;
        }
        Some(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_access_token_verifies() {
        let issuer = TokenIssuer::new("secret", 60);
        let issued = issuer.issue_access(42).unwrap();

        let claims = issuer.verify(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn token_type_must_match() {
        let issuer = TokenIssuer::new("secret", 60);
        let refresh = issuer.issue_refresh(1).unwrap();

        assert!(issuer.verify(&refresh.token, TokenType::Access).is_none());
        assert!(issuer.verify(&refresh.token, TokenType::Refresh).is_some());
        assert_eq!(
            refresh.claims.exp - refresh.claims.iat,
            REFRESH_TOKEN_LIFETIME_DAYS * 24 * 3600
        );
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let issuer = TokenIssuer::new("secret", 60);
        let other = TokenIssuer::new("another secret", 60);
        let token = other.issue_access(1).unwrap().token;

        assert!(issuer.verify(&token, TokenType::Access).is_none());
        assert!(issuer.verify("not.a.token", TokenType::Access).is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new("secret", -10);
        let token = issuer.issue_access(1).unwrap().token;
        assert!(issuer.verify(&token, TokenType::Access).is_none());
    }

    #[test]
    fn each_token_has_unique_jti() {
        let issuer = TokenIssuer::new("secret", 60);
        let a = issuer.issue_refresh(1).unwrap();
        let b = issuer.issue_refresh(1).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }
}
