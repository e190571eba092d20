use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupRef;
use super::validation::{self, POST_SENTINEL_TEXT, ValidationErrors};
use crate::config::TextPolicy;

/// Post entity - a blog entry owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    ///
    /// Ids are UUIDv7, so they sort in creation order and break ties between
    /// equal `created_at` values.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            author_id,
            group_id: draft.group_id,
            text: draft.text,
            image: draft.image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields, keeping identity, author and creation time.
    pub fn apply(&mut self, draft: PostDraft) {
        self.text = draft.text;
        self.group_id = draft.group_id;
        self.image = draft.image;
        self.updated_at = Utc::now();
    }

    /// Save-boundary check; same rules as [`PostDraft::validate`].
    pub fn validate(&self, policy: &TextPolicy) -> Result<(), ValidationErrors> {
        validate_post_text(&self.text, policy)
    }

    /// Short label used in logs.
    pub fn preview(&self) -> String {
        self.text.chars().take(15).collect()
    }
}

/// User input for creating or editing a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub text: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Input-boundary check.
    pub fn validate(&self, policy: &TextPolicy) -> Result<(), ValidationErrors> {
        validate_post_text(&self.text, policy)
    }
}

fn validate_post_text(text: &str, policy: &TextPolicy) -> Result<(), ValidationErrors> {
    match validation::check_text(text, &policy.post_sentinel, POST_SENTINEL_TEXT) {
        Some(message) => Err(ValidationErrors::single("text", message)),
        None => Ok(()),
    }
}

/// The author fields shown next to a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

/// A post as exposed to rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub id: Uuid,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_and_entity_agree() {
        let policy = TextPolicy::default();
        for text in ["yandex", "   ", ""] {
            let draft = PostDraft::new(text);
            let draft_err = draft.validate(&policy).unwrap_err();
            let post = Post::new(Uuid::new_v4(), draft);
            assert_eq!(post.validate(&policy).unwrap_err(), draft_err);
        }
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let author = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..100)
            .map(|i| Post::new(author, PostDraft::new(format!("post {i}"))).id)
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_custom_sentinel() {
        let policy = TextPolicy {
            post_sentinel: "spam".to_string(),
            ..TextPolicy::default()
        };
        assert!(PostDraft::new("yandex").validate(&policy).is_ok());
        let errors = PostDraft::new("spam").validate(&policy).unwrap_err();
        assert_eq!(errors.messages_for("text"), vec![POST_SENTINEL_TEXT]);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, PostDraft::new("first"));
        let (id, created) = (post.id, post.created_at);

        post.apply(PostDraft::new("second").in_group(Uuid::new_v4()));

        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author);
        assert_eq!(post.created_at, created);
        assert_eq!(post.text, "second");
        assert!(post.group_id.is_some());
    }
}
