use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use keepwell_core::error::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_seconds: i64,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String, expiry_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            expiry_seconds,
        }
    }

    pub fn create_token(&self, user_id: Uuid, email: &str) -> Result<String, CoreError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.expiry_seconds);

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CoreError::Internal(format!("failed to sign token: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, CoreError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| CoreError::Auth(format!("invalid token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_token() {
        let service = JwtService::new("test-secret", "keepwell".to_string(), 3600);
        let user_id = Uuid::new_v4();
        let token = service.create_token(user_id, "user@example.com").unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let a = JwtService::new("secret-a", "keepwell".to_string(), 3600);
        let b = JwtService::new("secret-b", "keepwell".to_string(), 3600);
        let token = a.create_token(Uuid::new_v4(), "user@example.com").unwrap();
        assert!(b.verify_token(&token).is_err());
    }
}
