use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidationErrors;

/// Follow edge - `user` receives `author`'s posts in their following feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(user_id: Uuid, author_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            author_id,
            created_at: Utc::now(),
        }
    }

    /// Stores refuse self-loops before writing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.user_id == self.author_id {
            return Err(ValidationErrors::single("author", "users cannot follow themselves"));
        }
        Ok(())
    }
}
