//! Post detail, authoring and comments.

use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use quill_core::domain::{CommentDraft, PostDraft};
use quill_core::ports::View;
use quill_core::services::EditOutcome;
use quill_shared::dto::{CommentRequest, PostRequest};

use super::{post_url, profile_url, redirect, render_view};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn draft(req: PostRequest) -> PostDraft {
    PostDraft {
        text: req.text,
        group_id: req.group,
        image: req.image,
    }
}

/// GET /api/posts/{post_id}
pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.post_detail(post_id.into_inner()).await?;
    render_view(&state, View::PostDetail, &detail)
}

/// GET /api/create - the empty post form.
pub async fn post_create_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_groups().await?;
    render_view(
        &state,
        View::CreatePost,
        &json!({ "is_edit": false, "groups": groups }),
    )
}

/// POST /api/create
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = draft(body.into_inner());
    draft.validate(state.posts.policy())?;

    state.posts.create_post(identity.user_id, draft).await?;

    Ok(redirect(profile_url(&identity.username)))
}

/// GET /api/posts/{post_id}/edit - the post form filled in for its author.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let detail = state.posts.post_detail(post_id).await?;
    if detail.post.author.id != identity.user_id {
        return Ok(redirect(post_url(post_id)));
    }

    let groups = state.groups.list_groups().await?;
    render_view(
        &state,
        View::CreatePost,
        &json!({ "is_edit": true, "post": detail.post, "groups": groups }),
    )
}

/// POST /api/posts/{post_id}/edit
///
/// Anyone but the author is sent back to the post untouched.
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let detail = state.posts.post_detail(post_id).await?;
    let draft = draft(body.into_inner());
    if detail.post.author.id == identity.user_id {
        draft.validate(state.posts.policy())?;
    }

    let outcome = state
        .posts
        .edit_post(identity.user_id, post_id, draft)
        .await?;
    if let EditOutcome::NotOwner { .. } = outcome {
        tracing::warn!(%post_id, user = %identity.username, "Edit of someone else's post refused");
    }

    Ok(redirect(post_url(post_id)))
}

/// POST /api/posts/{post_id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let draft = CommentDraft::new(body.into_inner().text);
    draft.validate(state.posts.policy())?;

    state
        .posts
        .add_comment(identity.user_id, post_id, draft)
        .await?;

    Ok(redirect(post_url(post_id)))
}
