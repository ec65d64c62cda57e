//! Token issuing and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use dockwatch_core::{Config, Error, Result};

/// Token lifetime in seconds (24 hours).
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated username.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Issues and verifies the signed, time-limited tokens gating the API.
#[derive(Clone)]
pub struct Auth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    username: String,
    password: String,
}

impl Auth {
    /// Build from the configured credential pair and signing secret.
    pub fn new(config: &Config) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Verify a username/password pair and issue a token.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        if username != self.username || password != self.password {
            return Err(Error::Auth("invalid credentials".to_string()));
        }
        self.issue(username)
    }

    /// Issue a token for an already-verified user.
    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| Error::Auth(e.to_string()))
    }

    /// Verify a token's signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| Error::Auth(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> Auth {
        Auth::new(&Config::default())
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = auth();
        let token = auth.issue("admin").unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn login_checks_the_configured_pair() {
        let auth = auth();
        assert!(auth.login("admin", "admin").is_ok());
        assert!(auth.login("admin", "wrong").is_err());
        assert!(auth.login("intruder", "admin").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = auth();
        // Issue a token that expired two hours ago, beyond any leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            iat: now - 3 * 60 * 60,
            exp: now - 2 * 60 * 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Config::default().jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(auth.verify(&token).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let auth = auth();
        let mut other = Config::default();
        other.jwt_secret = "some-other-secret".to_string();
        let forged = Auth::new(&other).issue("admin").unwrap();
        assert!(auth.verify(&forged).is_err());
        assert!(auth.verify("not-a-token").is_err());
    }
}
