//! Credential checks, password hashing, and the bearer-token identity
//! used by every protected route.

use std::future::{ready, Ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const TOKEN_TTL_DAYS: i64 = 2;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// HS256 key pair derived from the configured secret, shared as app data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub email: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

pub fn issue_token(user_id: Uuid, email: &str, keys: &JwtKeys) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| AppError::Internal(format!("Token issuance failed: {}", e)))
}

pub fn verify_token(token: &str, keys: &JwtKeys) -> Result<Claims, AppError> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Identity of the caller, taken from the `Authorization: Bearer` header.
/// Handlers that take this as an argument reject unauthenticated requests
/// before their body runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let keys = match req.app_data::<web::Data<JwtKeys>>() {
            Some(keys) => keys,
            None => {
                return ready(Err(AppError::Internal(
                    "JWT keys are not configured".to_string(),
                )))
            }
        };

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = match header.and_then(|value| value.strip_prefix("Bearer ")) {
            Some(token) => token,
            None => {
                return ready(Err(AppError::Unauthorized(
                    "Authentication required".to_string(),
                )))
            }
        };

        ready(verify_token(token, keys).map(|claims| AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
        }))
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Accepts `local@domain.tld` shapes: non-empty local part, a dot in the
/// domain with something on both sides, no whitespace, exactly one `@`.
pub fn email_is_valid(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !domain.chars().any(char::is_whitespace)
}

/// Password policy: 8 to 128 characters with at least one uppercase
/// letter, one lowercase letter, one digit, and one special character.
pub fn check_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err("Password must contain at least one special character");
    }
    if password.chars().count() > 128 {
        return Err("Password must be less than 128 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn keys() -> JwtKeys {
        JwtKeys::from_secret("test-secret")
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(email_is_valid("alice@example.com"));
        assert!(email_is_valid("a.b+tag@sub.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "alice",
            "alice@",
            "@example.com",
            "alice@example",
            "alice@.com",
            "alice@example.",
            "al ice@example.com",
            "alice@exa mple.com",
            "alice@@example.com",
        ] {
            assert!(!email_is_valid(email), "{email:?} should be invalid");
        }
    }

    #[test]
    fn strong_password_passes() {
        assert_eq!(check_password_strength("Str0ng!pass"), Ok(()));
    }

    #[test]
    fn each_policy_rule_reports_its_own_message() {
        assert_eq!(
            check_password_strength("Ab1!"),
            Err("Password must be at least 8 characters long")
        );
        assert_eq!(
            check_password_strength("weak1!pass"),
            Err("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            check_password_strength("WEAK1!PASS"),
            Err("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            check_password_strength("Weak!pass"),
            Err("Password must contain at least one number")
        );
        assert_eq!(
            check_password_strength("Weak1pass"),
            Err("Password must contain at least one special character")
        );
        let long = format!("Aa1!{}", "x".repeat(130));
        assert_eq!(
            check_password_strength(&long),
            Err("Password must be less than 128 characters")
        );
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("Str0ng!pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "Str0ng!pass").unwrap());
        assert!(!verify_password(&hash, "Wr0ng!pass").unwrap());
    }

    #[test]
    fn garbage_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("not-a-phc-string", "whatever"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn token_round_trips_claims() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "alice@example.com", &keys).unwrap();

        let claims = verify_token(&token, &keys).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(matches!(
            verify_token(&token, &keys),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), "alice@example.com", &keys()).unwrap();

        assert!(matches!(
            verify_token(&token, &JwtKeys::from_secret("other-secret")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_accepts_a_valid_bearer_token() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "alice@example.com", &keys).unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(keys))
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();

        let user = AuthenticatedUser::extract(&req).await.unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "alice@example.com");
    }

    #[actix_web::test]
    async fn extractor_rejects_a_missing_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(keys()))
            .to_http_request();

        assert!(matches!(
            AuthenticatedUser::extract(&req).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_rejects_a_non_bearer_scheme() {
        let req = TestRequest::default()
            .app_data(web::Data::new(keys()))
            .insert_header((AUTHORIZATION, "Basic YWxpY2U6cHc="))
            .to_http_request();

        assert!(matches!(
            AuthenticatedUser::extract(&req).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
