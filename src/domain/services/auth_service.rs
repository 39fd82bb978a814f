use crate::domain::models::auth::Claims;
use crate::error::AppError;
use crate::config::Config;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;

/// Password hashing and stateless bearer tokens.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: Duration,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expires_in: Duration::from_std(config.jwt_expires_in).unwrap_or(Duration::days(90)),
        }
    }

    pub fn hash_password(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
    }

    /// False for a wrong password and for a stored hash that does not parse.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    pub fn issue_token(&self, principal_id: &str) -> Result<String, AppError> {
        self.issue_token_at(principal_id, Utc::now())
    }

    pub fn issue_token_at(&self, principal_id: &str, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: principal_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.expires_in).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("JWT encoding failed: {}", e);
            AppError::Internal
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized("Invalid token. Please log in again!".into())
            })
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailTransport;

    fn service(secret: &str) -> AuthService {
        AuthService::new(&Config {
            database_url: "sqlite::memory:".into(),
            port: 3000,
            jwt_secret: secret.into(),
            jwt_expires_in: std::time::Duration::from_secs(3600),
            frontend_url: "http://localhost:5173".into(),
            public_base_url: "http://localhost:3000".into(),
            admin_email: None,
            mail_transport: MailTransport::Log,
            mail_from: "noreply@test".into(),
            support_email: "support@test".into(),
            support_url: "http://support".into(),
            login_url: "http://localhost:5173/login".into(),
        })
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let auth = service("secret");
        let hash = auth.hash_password("p1").unwrap();
        assert_ne!(hash, "p1");
        assert!(auth.verify_password("p1", &hash));
        assert!(!auth.verify_password("wrong", &hash));
        assert!(!auth.verify_password("p1", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trip_keeps_subject() {
        let auth = service("secret");
        let token = auth.issue_token("abc").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service("one").issue_token("abc").unwrap();
        assert!(matches!(service("two").verify_token(&token), Err(AppError::Unauthorized(_))));
        assert!(service("one").verify_token("garbage").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service("secret");
        let token = auth.issue_token_at("abc", Utc::now() - Duration::hours(2)).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }
}
