//! Post detail, authoring and commenting.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::TextPolicy;
use crate::domain::{
    Comment, CommentDraft, CommentEntry, Post, PostDraft, PostEntry, ValidationErrors,
};
use crate::error::DomainError;
use crate::ports::{CommentRepository, GroupRepository, PostFilter, PostRepository};

use super::entries::EntryLoader;

/// Everything the post detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostEntry,
    pub author_post_count: usize,
    pub comments: Vec<CommentEntry>,
}

/// Result of an edit request.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Post),
    /// The actor does not own the post; nothing was written.
    NotOwner { post_id: Uuid },
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    groups: Arc<dyn GroupRepository>,
    entries: EntryLoader,
    policy: TextPolicy,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        groups: Arc<dyn GroupRepository>,
        entries: EntryLoader,
        policy: TextPolicy,
    ) -> Self {
        Self {
            posts,
            comments,
            groups,
            entries,
            policy,
        }
    }

    /// Text rules, for checking drafts before they reach the service.
    pub fn policy(&self) -> &TextPolicy {
        &self.policy
    }

    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.find(post_id).await?;
        let author_post_count = self.posts.count(&PostFilter::Author(post.author_id)).await?;

        let post = self
            .entries
            .posts(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let comments = self
            .entries
            .comments(self.comments.list_for_post(post_id).await?)
            .await?;

        Ok(PostDetail {
            post,
            author_post_count,
            comments,
        })
    }

    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        let post = Post::new(author_id, draft);
        self.validate(&post).await?;

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, %author_id, "Post created");
        Ok(saved)
    }

    /// Only the author may edit; anyone else gets [`EditOutcome::NotOwner`].
    pub async fn edit_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        draft: PostDraft,
    ) -> Result<EditOutcome, DomainError> {
        let mut post = self.find(post_id).await?;
        if post.author_id != actor_id {
            tracing::debug!(%post_id, %actor_id, "Edit by non-owner refused");
            return Ok(EditOutcome::NotOwner { post_id });
        }

        post.apply(draft);
        self.validate(&post).await?;

        let saved = self.posts.save(post).await?;
        tracing::info!(%post_id, preview = %saved.preview(), "Post updated");
        Ok(EditOutcome::Updated(saved))
    }

    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        self.find(post_id).await?;

        let comment = Comment::new(post_id, author_id, draft);
        comment.validate(&self.policy)?;

        let saved = self.comments.save(comment).await?;
        tracing::info!(comment_id = %saved.id, %post_id, "Comment added");
        Ok(saved)
    }

    async fn find(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Save-boundary checks: text rules plus a group that exists.
    async fn validate(&self, post: &Post) -> Result<(), DomainError> {
        let mut errors = match post.validate(&self.policy) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(group_id) = post.group_id {
            if self.groups.find_by_id(group_id).await?.is_none() {
                errors.push("group", "select a valid group");
            }
        }

        errors.into_result().map_err(DomainError::Validation)
    }
}
