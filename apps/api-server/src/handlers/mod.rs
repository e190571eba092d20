//! HTTP handlers and route configuration.

mod auth;
mod feeds;
mod follow;
mod groups;
mod health;
mod posts;


use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_core::PageNumber;
use quill_core::ports::View;
use quill_shared::dto::PageQuery;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Feeds
            .route("/", web::get().to(feeds::index))
            .route("/group/{slug}", web::get().to(feeds::group_posts))
            .route("/profile/{username}", web::get().to(feeds::profile))
            .route("/follow", web::get().to(feeds::follow_index))
            // Follow graph
            .route("/profile/{username}/follow", web::post().to(follow::profile_follow))
            .route(
                "/profile/{username}/unfollow",
                web::post().to(follow::profile_unfollow),
            )
            // Posts
            .service(
                web::resource("/create")
                    .route(web::get().to(posts::post_create_form))
                    .route(web::post().to(posts::post_create)),
            )
            .route("/posts/{post_id}", web::get().to(posts::post_detail))
            .service(
                web::resource("/posts/{post_id}/edit")
                    .route(web::get().to(posts::post_edit_form))
                    .route(web::post().to(posts::post_edit)),
            )
            .route("/posts/{post_id}/comment", web::post().to(posts::add_comment))
            // Groups
            .service(
                web::resource("/groups")
                    .route(web::get().to(groups::group_index))
                    .route(web::post().to(groups::create_group)),
            ),
    );
}

fn page_number(query: &PageQuery) -> PageNumber {
    PageNumber::parse(query.page.as_deref())
}

/// A rendered view body with the renderer's content type.
fn rendered(state: &AppState, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(state.renderer.content_type())
        .body(body)
}

fn render_view<T: Serialize>(state: &AppState, view: View, context: &T) -> AppResult<HttpResponse> {
    let context = serde_json::to_value(context).map_err(|e| AppError::Internal(e.to_string()))?;
    let body = state
        .renderer
        .render(view, &context)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(rendered(state, body))
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn profile_url(username: &str) -> String {
    format!("/api/profile/{username}")
}

fn post_url(post_id: uuid::Uuid) -> String {
    format!("/api/posts/{post_id}")
}
