//! In-memory entity store - used for tests and when no database is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Follow, Group, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};

/// Rows in insertion order.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn group_exists(&self, id: Uuid) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    fn post_exists(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    /// Newest first; equal `created_at` falls back to the time-ordered id,
    /// matching the Postgres ordering.
    fn posts_matching(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .rev()
            .filter(|post| match filter {
                PostFilter::All => true,
                PostFilter::Group(id) => post.group_id == Some(*id),
                PostFilter::Author(id) => post.author_id == *id,
                PostFilter::Authors(ids) => ids.contains(&post.author_id),
            })
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }
}

/// Insert `row`, or replace the row with the same id in place.
fn upsert<T>(rows: &mut Vec<T>, row: T, id: impl Fn(&T) -> Uuid) {
    let key = id(&row);
    match rows.iter_mut().find(|r| id(r) == key) {
        Some(slot) => *slot = row,
        None => rows.push(row),
    }
}

/// All five tables behind one lock.
///
/// Every write, cascades included, happens under a single write guard, so
/// a rejected write leaves nothing behind and readers never see a cascade
/// half-applied. Deletes follow the relational rules: removing a user
/// removes their posts, comments and follow edges; removing a post removes
/// its comments; removing a group empties the group of its posts.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of follow edges, for diagnostics and tests.
    pub async fn follow_count(&self) -> usize {
        self.tables.read().await.follows.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(RepoError::constraint(
                "username",
                "a user with that username already exists",
            ));
        }

        upsert(&mut tables.users, user.clone(), |u| u.id);
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(id) {
            return Err(RepoError::NotFound);
        }

        let authored: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();

        tables
            .comments
            .retain(|c| c.author_id != id && !authored.contains(&c.post_id));
        tables.posts.retain(|p| p.author_id != id);
        tables
            .follows
            .retain(|f| f.user_id != id && f.author_id != id);
        tables.users.retain(|u| u.id != id);

        tracing::debug!(user_id = %id, posts = authored.len(), "User deleted with cascade");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn save(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .groups
            .iter()
            .any(|g| g.slug == group.slug && g.id != group.id)
        {
            return Err(RepoError::constraint(
                "slug",
                "group with this slug already exists",
            ));
        }

        upsert(&mut tables.groups, group.clone(), |g| g.id);
        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.group_exists(id) {
            return Err(RepoError::NotFound);
        }

        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        tables.groups.retain(|g| g.id != id);
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(post.author_id) {
            return Err(RepoError::constraint("author", "author does not exist"));
        }
        if let Some(group_id) = post.group_id {
            if !tables.group_exists(group_id) {
                return Err(RepoError::constraint("group", "select a valid group"));
            }
        }

        upsert(&mut tables.posts, post.clone(), |p| p.id);
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(id) {
            return Err(RepoError::NotFound);
        }

        tables.comments.retain(|c| c.post_id != id);
        tables.posts.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, filter: &PostFilter) -> Result<usize, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts_matching(filter).len())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts_matching(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(comment.post_id) {
            return Err(RepoError::constraint("post", "post does not exist"));
        }
        if !tables.user_exists(comment.author_id) {
            return Err(RepoError::constraint("author", "author does not exist"));
        }

        upsert(&mut tables.comments, comment.clone(), |c| c.id);
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert(&self, follow: Follow) -> Result<Follow, RepoError> {
        if let Err(errors) = follow.validate() {
            let violation = &errors.violations()[0];
            return Err(RepoError::constraint(
                violation.field.clone(),
                violation.message.clone(),
            ));
        }

        let mut tables = self.tables.write().await;
        if !tables.user_exists(follow.user_id) {
            return Err(RepoError::constraint("user", "user does not exist"));
        }
        if !tables.user_exists(follow.author_id) {
            return Err(RepoError::constraint("author", "author does not exist"));
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == follow.user_id && f.author_id == follow.author_id)
        {
            return Err(RepoError::constraint("author", "already following this author"));
        }

        tables.follows.push(follow.clone());
        Ok(follow)
    }

    async fn remove(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn authors_followed_by(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::PostDraft;

    async fn user(store: &InMemoryStore, name: &str) -> User {
        BaseRepository::<User, Uuid>::save(store, User::new(name.to_string(), "hash".to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let store = InMemoryStore::new();
        user(&store, "leo").await;

        let err = BaseRepository::<User, Uuid>::save(
            &store,
            User::new("leo".to_string(), "other".to_string()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RepoError::Constraint { field, .. } if field == "username"));
    }

    #[tokio::test]
    async fn test_post_update_keeps_position() {
        let store = InMemoryStore::new();
        let author = user(&store, "leo").await;
        let first = BaseRepository::<Post, Uuid>::save(&store, Post::new(author.id, PostDraft::new("a")))
            .await
            .unwrap();
        BaseRepository::<Post, Uuid>::save(&store, Post::new(author.id, PostDraft::new("b")))
            .await
            .unwrap();

        let mut edited = first.clone();
        edited.text = "a2".to_string();
        BaseRepository::<Post, Uuid>::save(&store, edited).await.unwrap();

        assert_eq!(store.count(&PostFilter::All).await.unwrap(), 2);
        let found = BaseRepository::<Post, Uuid>::find_by_id(&store, first.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.text, "a2");
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let store = InMemoryStore::new();
        let author = user(&store, "leo").await;
        let older = Post::new(author.id, PostDraft::new("older"));
        let mut newer = Post::new(author.id, PostDraft::new("newer"));
        newer.created_at = older.created_at;

        // Saved out of creation order on purpose.
        BaseRepository::<Post, Uuid>::save(&store, newer).await.unwrap();
        BaseRepository::<Post, Uuid>::save(&store, older).await.unwrap();

        let posts = PostRepository::list(&store, &PostFilter::All, 0, 10).await.unwrap();
        let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_follow_constraints() {
        let store = InMemoryStore::new();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        assert!(store.insert(Follow::new(a.id, a.id)).await.is_err());
        store.insert(Follow::new(a.id, b.id)).await.unwrap();
        assert!(store.insert(Follow::new(a.id, b.id)).await.is_err());
        assert_eq!(store.follow_count().await, 1);

        assert!(store.remove(a.id, b.id).await.unwrap());
        assert!(!store.remove(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = InMemoryStore::new();
        let err = BaseRepository::<Post, Uuid>::delete(&store, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}
