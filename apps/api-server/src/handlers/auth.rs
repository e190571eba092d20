//! Authentication handlers.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use quill_core::domain::{User, ValidationErrors};
use quill_core::error::DomainError;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(req: &RegisterUserRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = req.username.trim();
    if username.is_empty() {
        errors.push("username", "username must not be empty");
    } else if username.chars().count() > 150
        || !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push(
            "username",
            "use at most 150 letters, digits and @/./+/-/_ characters",
        );
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "password must be at least 8 characters");
    }

    errors.into_result()
}

fn token_response(
    token_service: &dyn TokenService,
    user: &User,
    roles: Vec<String>,
) -> AppResult<AuthResponse> {
    let token = token_service.generate_token(user.id, &user.username, roles)?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req)?;

    let username = req.username.trim();
    if state.users.find_by_username(username).await?.is_some() {
        return Err(DomainError::Duplicate(format!("username {username} is taken")).into());
    }

    let password_hash = password_service.hash(&req.password)?;
    let user = state
        .users
        .save(User::new(username.to_string(), password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let roles = state.roles_for(&user.username);
    Ok(HttpResponse::Created().json(token_response(token_service.get_ref().as_ref(), &user, roles)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password_service.verify(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let roles = state.roles_for(&user.username);
    Ok(HttpResponse::Ok().json(token_response(token_service.get_ref().as_ref(), &user, roles)?))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.user_id,
        username: identity.username,
        roles: identity.roles,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_registration_accepts_punctuated_usernames() {
        assert!(validate_registration(&request("leo.tolstoy+1@x", "long-enough")).is_ok());
    }

    #[test]
    fn test_registration_reports_each_field() {
        let errors = validate_registration(&request("bad name", "short")).unwrap_err();

        assert_eq!(errors.messages_for("username").len(), 1);
        assert_eq!(errors.messages_for("password").len(), 1);
    }
}
