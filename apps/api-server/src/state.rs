//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, PostRepository, Renderer,
    UserRepository,
};
use quill_core::services::{EntryLoader, FeedService, FollowGraph, GroupService, PostService};
use quill_core::{FeedConfig, TextPolicy};
use quill_infra::{InMemoryCache, InMemoryStore, JsonRenderer};

use crate::config::AppConfig;

/// One handle per entity table.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    /// All tables backed by one in-process store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &quill_infra::DatabaseConnections) -> Self {
        use quill_infra::database::{
            PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
            PostgresPostRepository, PostgresUserRepository,
        };

        let db = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub feeds: FeedService,
    pub posts: PostService,
    pub follows: FollowGraph,
    pub groups: GroupService,
    pub renderer: Arc<dyn Renderer>,
    pub admin_usernames: Arc<[String]>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = repositories(config).await;
        let cache = cache(config).await;

        tracing::info!("Application state initialized");

        Self::from_parts(
            repos,
            cache,
            &config.feed,
            config.text_policy.clone(),
            config.admin_usernames.clone(),
        )
    }

    /// Wire the services over already-built adapters.
    pub fn from_parts(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        feed: &FeedConfig,
        policy: TextPolicy,
        admin_usernames: Vec<String>,
    ) -> Self {
        let follows = FollowGraph::new(repos.follows.clone(), repos.users.clone());
        let entries = EntryLoader::new(repos.users.clone(), repos.groups.clone());
        let renderer: Arc<dyn Renderer> = Arc::new(JsonRenderer::new());

        let feeds = FeedService::new(
            repos.posts.clone(),
            repos.users.clone(),
            repos.groups.clone(),
            follows.clone(),
            cache,
            renderer.clone(),
            feed,
        );
        let posts = PostService::new(
            repos.posts,
            repos.comments,
            repos.groups.clone(),
            entries,
            policy,
        );

        Self {
            users: repos.users,
            feeds,
            posts,
            follows,
            groups: GroupService::new(repos.groups),
            renderer,
            admin_usernames: admin_usernames.into(),
        }
    }

    /// Roles carried in the token of `username`.
    pub fn roles_for(&self, username: &str) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.admin_usernames.iter().any(|admin| admin == username) {
            roles.push("admin".to_string());
        }
        roles
    }
}

#[cfg(feature = "postgres")]
async fn repositories(config: &AppConfig) -> Repositories {
    use quill_infra::DatabaseConnections;

    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Repositories::in_memory(Arc::new(InMemoryStore::new()));
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => {
            if config.auto_migrate {
                use migration::{Migrator, MigratorTrait};

                if let Err(e) = Migrator::up(&connections.main, None).await {
                    tracing::error!(error = %e, "Failed to apply migrations");
                }
            }
            Repositories::postgres(&connections)
        }
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Repositories::in_memory(Arc::new(InMemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn repositories(_config: &AppConfig) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory store");
    Repositories::in_memory(Arc::new(InMemoryStore::new()))
}

#[cfg(feature = "redis")]
async fn cache(config: &AppConfig) -> Arc<dyn Cache> {
    use quill_infra::{RedisCache, RedisConfig};

    let Some(url) = config.redis_url.clone() else {
        return Arc::new(InMemoryCache::new());
    };

    match RedisCache::new(RedisConfig {
        url,
        ..RedisConfig::from_env()
    })
    .await
    {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::error!(error = %e, "Redis unavailable. Using in-memory cache.");
            Arc::new(InMemoryCache::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn cache(config: &AppConfig) -> Arc<dyn Cache> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL set but the redis feature is disabled. Using in-memory cache.");
    }
    Arc::new(InMemoryCache::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_role_granted_by_username() {
        let state = AppState::from_parts(
            Repositories::in_memory(Arc::new(InMemoryStore::new())),
            Arc::new(InMemoryCache::new()),
            &FeedConfig::default(),
            TextPolicy::default(),
            vec!["boss".to_string()],
        );

        assert_eq!(state.roles_for("boss"), vec!["user", "admin"]);
        assert_eq!(state.roles_for("leo"), vec!["user"]);
    }
}
