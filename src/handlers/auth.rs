use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{self, JwtKeys};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{NewUser, User};
use crate::schema::users;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Normalizes and checks the credentials common to both auth endpoints.
fn validate_credentials(email: &str, password: &str) -> Result<String, AppError> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    let email = email.trim().to_lowercase();
    if !auth::email_is_valid(&email) {
        return Err(AppError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/auth/register
///
/// Creates a user and answers with a fresh bearer token. Password hashing
/// runs on the blocking pool next to the database work.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid credentials supplied, or the user already exists"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "auth"
)]
pub async fn register(
    pool: web::Data<DbPool>,
    keys: web::Data<JwtKeys>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let email = validate_credentials(&body.email, &body.password)?;
    if email.len() > 255 {
        return Err(AppError::Validation("Email address is too long".to_string()));
    }
    auth::check_password_strength(&body.password)
        .map_err(|msg| AppError::Validation(msg.to_string()))?;

    log::info!("registration attempt for {}", email);

    let user = web::block(move || {
        let mut conn = pool.get()?;

        let existing = users::table
            .filter(users::email.eq(&email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        if existing.is_some() {
            log::warn!("registration failed, user already exists: {}", email);
            return Err(AppError::Validation("User already exists".to_string()));
        }

        let new_user = NewUser {
            id: Uuid::new_v4(),
            email,
            password_hash: auth::hash_password(&body.password)?,
        };
        // Two concurrent registrations can pass the existence check; the
        // unique constraint decides, and its violation is the same answer.
        if let Err(e) = diesel::insert_into(users::table)
            .values(&new_user)
            .execute(&mut conn)
        {
            return Err(match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AppError::Validation("User already exists".to_string())
                }
                other => other.into(),
            });
        }

        Ok((new_user.id, new_user.email))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let (user_id, email) = user;
    let token = auth::issue_token(user_id, &email, &keys)?;

    log::info!("user registered: {} ({})", email, user_id);

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: UserResponse { id: user_id, email },
    }))
}

/// POST /api/auth/login
///
/// Verifies credentials and answers with a bearer token. Unknown users
/// and wrong passwords get the same answer.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Malformed credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "auth"
)]
pub async fn login(
    pool: web::Data<DbPool>,
    keys: web::Data<JwtKeys>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let email = validate_credentials(&body.email, &body.password)?;
    if body.password.trim().is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let user = web::block(move || {
        let mut conn = pool.get()?;

        let user = users::table
            .filter(users::email.eq(&email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(user) = user else {
            log::warn!("login failed, user not found: {}", email);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        };

        if !auth::verify_password(&user.password_hash, &body.password)? {
            log::warn!("login failed, password mismatch: {}", email);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        Ok(user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let token = auth::issue_token(user.id, &user.email, &keys)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse {
            id: user.id,
            email: user.email,
        },
    }))
}
