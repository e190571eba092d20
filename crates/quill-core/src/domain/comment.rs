use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::AuthorRef;
use super::validation::{self, COMMENT_SENTINEL_TEXT, ValidationErrors};
use crate::config::TextPolicy;

/// Comment entity - belongs to a post and to its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, draft: CommentDraft) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            author_id,
            text: draft.text,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self, policy: &TextPolicy) -> Result<(), ValidationErrors> {
        validate_comment_text(&self.text, policy)
    }
}

/// User input for a new comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self, policy: &TextPolicy) -> Result<(), ValidationErrors> {
        validate_comment_text(&self.text, policy)
    }
}

fn validate_comment_text(text: &str, policy: &TextPolicy) -> Result<(), ValidationErrors> {
    match validation::check_text(text, &policy.comment_sentinel, COMMENT_SENTINEL_TEXT) {
        Some(message) => Err(ValidationErrors::single("text", message)),
        None => Ok(()),
    }
}

/// A comment as exposed to rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEntry {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_sentinel_is_separate_from_post_sentinel() {
        let policy = TextPolicy::default();
        assert!(CommentDraft::new("yandex").validate(&policy).is_ok());

        let errors = CommentDraft::new("азазазаз!!!1!1!")
            .validate(&policy)
            .unwrap_err();
        assert_eq!(errors.messages_for("text"), vec![COMMENT_SENTINEL_TEXT]);
    }

    #[test]
    fn test_entity_rejects_whitespace() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), CommentDraft::new("\n\n"));
        assert!(comment.validate(&TextPolicy::default()).is_err());
    }
}
