use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Account role carried inside the token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Captain,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    /// Token expiry as a timestamp, for the revocation table
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Sign a bearer token for the given account
///
/// # Errors
/// Returns an error if signing fails
pub fn issue(
    secret: &SecretString,
    sub: Uuid,
    role: Role,
    ttl_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = unix_now();

    let claims = Claims {
        sub,
        role,
        iat,
        exp: iat + ttl_seconds,
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());

    encode(&Header::default(), &claims, &key)
}

/// Verify a bearer token signature and expiry, returning its claims
///
/// # Errors
/// Returns an error if the token is malformed, tampered with or expired
pub fn verify(secret: &SecretString, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    // No exp leeway: blacklist rows live exactly until exp, so a token
    // must stop verifying at exp as well
    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = decode::<Claims>(token, &key, &validation)?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn secret() -> SecretString {
        SecretString::from("test-secret".to_string())
    }

    #[test]
    fn test_issue_and_verify() {
        let sub = Uuid::new_v4();
        let token = issue(&secret(), sub, Role::User, 3600).unwrap();

        let claims = verify(&secret(), &token).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_captain_role_round_trip() {
        let token = issue(&secret(), Uuid::new_v4(), Role::Captain, 3600).unwrap();
        let claims = verify(&secret(), &token).unwrap();
        assert_eq!(claims.role, Role::Captain);
    }

    #[test]
    fn test_verify_wrong_secret() {
        let token = issue(&secret(), Uuid::new_v4(), Role::User, 3600).unwrap();
        let other = SecretString::from("another-secret".to_string());
        assert!(verify(&other, &token).is_err());
    }

    #[test]
    fn test_verify_garbage_token() {
        assert!(verify(&secret(), "not.a.token").is_err());
    }

    #[test]
    fn test_verify_expired() {
        let iat = unix_now() - 7200;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            iat,
            exp: iat + 60,
        };
        let key = EncodingKey::from_secret(secret().expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let err = verify(&secret(), &token).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpiredSignature);
    }

    #[test]
    fn test_verify_rejects_just_expired() {
        // exp 30s in the past, inside what the default 60s leeway would
        // forgive. The matching blacklist row is already gone by then, so
        // the token must not verify either.
        let iat = unix_now() - 90;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            iat,
            exp: iat + 60,
        };
        let key = EncodingKey::from_secret(secret().expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(claims.expires_at() < Utc::now());

        let err = verify(&secret(), &token).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpiredSignature);
    }

    #[test]
    fn test_expires_at_matches_exp() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };
        assert_eq!(claims.expires_at().timestamp(), 1_700_086_400);
    }
}
