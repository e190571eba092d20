//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;
pub mod validation;

pub use comment::{Comment, CommentDraft, CommentEntry};
pub use follow::Follow;
pub use group::{Group, GroupDraft, GroupRef};
pub use post::{AuthorRef, Post, PostDraft, PostEntry};
pub use user::User;
pub use validation::{FieldViolation, ValidationErrors};
