//! Rendering port - turns a named view and its context into a response body.

use serde_json::Value;

/// Views the core prepares context for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Index,
    GroupList,
    Profile,
    Follow,
    PostDetail,
    CreatePost,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::Index => "posts/index",
            View::GroupList => "posts/group_list",
            View::Profile => "posts/profile",
            View::Follow => "posts/follow",
            View::PostDetail => "posts/post_detail",
            View::CreatePost => "posts/create_post",
        }
    }
}

/// Rendering layer. Never sees entities, only the prepared context.
pub trait Renderer: Send + Sync {
    fn render(&self, view: View, context: &Value) -> Result<String, RenderError>;

    /// MIME type of the produced body.
    fn content_type(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render {view}: {message}")]
    Failed { view: &'static str, message: String },
}
