use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AuthorRef, Comment, CommentEntry, GroupRef, Post, PostEntry};
use crate::error::DomainError;
use crate::ports::{GroupRepository, UserRepository};

/// Joins posts and comments with their authors and groups for rendering.
#[derive(Clone)]
pub struct EntryLoader {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl EntryLoader {
    pub fn new(users: Arc<dyn UserRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { users, groups }
    }

    /// Order is preserved. A post whose author no longer exists is dropped.
    pub async fn posts(&self, posts: Vec<Post>) -> Result<Vec<PostEntry>, DomainError> {
        let authors = self.authors(posts.iter().map(|p| p.author_id)).await?;

        let group_ids: Vec<Uuid> = unique(posts.iter().filter_map(|p| p.group_id));
        let groups: HashMap<Uuid, GroupRef> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .find_by_ids(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g.to_ref()))
                .collect()
        };

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id).cloned() else {
                    tracing::warn!(post_id = %post.id, "Skipping post with missing author");
                    return None;
                };
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Some(PostEntry {
                    id: post.id,
                    text: post.text,
                    image: post.image,
                    created_at: post.created_at,
                    author,
                    group,
                })
            })
            .collect())
    }

    pub async fn comments(&self, comments: Vec<Comment>) -> Result<Vec<CommentEntry>, DomainError> {
        let authors = self.authors(comments.iter().map(|c| c.author_id)).await?;

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                authors.get(&comment.author_id).cloned().map(|author| CommentEntry {
                    id: comment.id,
                    text: comment.text,
                    created_at: comment.created_at,
                    author,
                })
            })
            .collect())
    }

    async fn authors(
        &self,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, AuthorRef>, DomainError> {
        let ids = unique(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorRef {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect())
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
