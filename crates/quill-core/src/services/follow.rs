use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Follow, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{FollowRepository, UserRepository};

/// Directed "user follows author" edges.
///
/// Self-follows and repeated follows are silent no-ops, and unfollowing an
/// author that is not followed is not an error.
#[derive(Clone)]
pub struct FollowGraph {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowGraph {
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    /// Returns whether a new edge was created.
    pub async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        if user_id == author_id {
            tracing::debug!(%user_id, "Ignoring self-follow");
            return Ok(false);
        }
        if self.follows.exists(user_id, author_id).await? {
            return Ok(false);
        }

        match self.follows.insert(Follow::new(user_id, author_id)).await {
            Ok(_) => {
                tracing::debug!(%user_id, %author_id, "Follow edge created");
                Ok(true)
            }
            Err(err @ RepoError::Constraint { .. }) => {
                // Lost a race against an identical insert.
                if self.follows.exists(user_id, author_id).await? {
                    Ok(false)
                } else {
                    Err(err.into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns whether an edge was removed.
    pub async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let removed = self.follows.remove(user_id, author_id).await?;
        if removed {
            tracing::debug!(%user_id, %author_id, "Follow edge removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        if user_id == author_id {
            return Ok(false);
        }
        Ok(self.follows.exists(user_id, author_id).await?)
    }

    pub async fn following_author_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        Ok(self.follows.authors_followed_by(user_id).await?)
    }

    /// Every author `user_id` follows, ordered by username.
    pub async fn following_feed_authors(&self, user_id: Uuid) -> Result<Vec<User>, DomainError> {
        let ids = self.following_author_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut authors = self.users.find_by_ids(&ids).await?;
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }
}
