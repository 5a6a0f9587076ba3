//! Signed access tokens carried in the auth cookie

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{Caller, Role, UserID};

/// Claims stored in the token: who the caller is and until when
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: UserID,
    pub role: Role,
    pub exp: i64,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Caller {
            id: claims.id,
            role: claims.role,
        }
    }
}

/// Signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generate(&self, caller: Caller) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: caller.id,
            role: caller.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns None for any token that is malformed, forged or expired
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}
