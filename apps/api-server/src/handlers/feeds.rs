//! Feed pages: home, group, profile and following.

use actix_web::{HttpResponse, web};

use quill_shared::dto::PageQuery;

use super::{page_number, rendered};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/ - every post, served from the page cache.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let body = state.feeds.render_home(page_number(&query)).await?;
    Ok(rendered(&state, body))
}

/// GET /api/group/{slug}
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let body = state
        .feeds
        .render_group(&slug, page_number(&query))
        .await?;
    Ok(rendered(&state, body))
}

/// GET /api/profile/{username}
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let body = state
        .feeds
        .render_profile(&username, viewer.user_id(), page_number(&query))
        .await?;
    Ok(rendered(&state, body))
}

/// GET /api/follow - posts by authors the viewer follows.
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let body = state
        .feeds
        .render_following(identity.user_id, page_number(&query))
        .await?;
    Ok(rendered(&state, body))
}
