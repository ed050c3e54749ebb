//! Token issuing and verification
//!
//! Tokens are signed locally with HS256. The secret, issuer, audience and
//! expiry window come from [`Settings`].

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::Claims;
use crate::config::Settings;
use crate::domain::users::UserRole;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiry_hours: i64,
}

impl TokenService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            issuer: settings.jwt_issuer.clone(),
            audience: settings.jwt_audience.clone(),
            expiry_hours: settings.jwt_expiry_hours,
        }
    }

    /// Issue a signed token for an approved user
    pub fn issue(&self, user_id: Uuid, email: &str, role: UserRole) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            email: email.to_string(),
            role: role.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// Verify a token's signature, issuer, audience and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).context("Invalid token")?;

        Ok(data.claims)
    }

    /// Seconds until a freshly issued token expires
    pub fn expires_in(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn test_settings(secret: &str) -> Settings {
        Settings {
            env: Environment::Dev,
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "postgres://localhost/test".to_string(),
            database_max_connections: 1,
            cors_allow_origins: vec![],
            jwt_secret: secret.to_string(),
            jwt_issuer: "campushire-backend".to_string(),
            jwt_audience: "campushire".to_string(),
            jwt_expiry_hours: 1,
            smtp_host: "localhost".to_string(),
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_from: "noreply@campushire.local".to_string(),
            service_name: "CampusHire".to_string(),
            max_upload_bytes: 1024,
        }
    }

    #[test]
    fn issue_verify_round_trip() {
        let service = TokenService::new(&test_settings("test-secret"));
        let user_id = Uuid::new_v4();

        let token = service
            .issue(user_id, "tpo@college.edu", UserRole::College)
            .unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "tpo@college.edu");
        assert_eq!(claims.role, "college");
    }

    #[test]
    fn rejects_wrong_secret() {
        let issuer = TokenService::new(&test_settings("secret-a"));
        let verifier = TokenService::new(&test_settings("secret-b"));

        let token = issuer
            .issue(Uuid::new_v4(), "hr@acme.com", UserRole::Company)
            .unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let service = TokenService::new(&test_settings("test-secret"));
        assert!(service.verify("not-a-token").is_err());
    }
}
