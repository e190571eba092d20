//! Follow and unfollow actions.

use actix_web::{HttpResponse, web};

use quill_core::error::DomainError;
use quill_core::ports::UserRepository;
use quill_core::domain::User;

use super::{profile_url, redirect};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn author(users: &dyn UserRepository, username: &str) -> AppResult<User> {
    Ok(users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))?)
}

/// POST /api/profile/{username}/follow
pub async fn profile_follow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = author(state.users.as_ref(), &username).await?;
    let created = state.follows.follow(identity.user_id, author.id).await?;
    if created {
        tracing::info!(follower = %identity.username, author = %author.username, "Followed");
    }

    Ok(redirect(profile_url(&author.username)))
}

/// POST /api/profile/{username}/unfollow
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = author(state.users.as_ref(), &username).await?;
    let removed = state.follows.unfollow(identity.user_id, author.id).await?;
    if removed {
        tracing::info!(follower = %identity.username, author = %author.username, "Unfollowed");
    }

    Ok(redirect(profile_url(&author.username)))
}
