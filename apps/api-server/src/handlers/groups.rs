//! Group administration.

use actix_web::{HttpResponse, web};

use quill_core::domain::GroupDraft;
use quill_shared::ApiResponse;
use quill_shared::dto::GroupRequest;

use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/groups
pub async fn group_index(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups = state.groups.list_groups().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(groups)))
}

/// POST /api/groups - admin only.
pub async fn create_group(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    body: web::Json<GroupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let group = state
        .groups
        .create_group(GroupDraft {
            title: req.title,
            slug: req.slug,
            description: req.description,
        })
        .await?;
    tracing::info!(admin = %admin.0.username, slug = %group.slug, "Group created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(group, "group created")))
}
