//! Feed assembly for the home, group, profile and following views.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::domain::{AuthorRef, Group, PostEntry};
use crate::error::DomainError;
use crate::pagination::{Page, PageNumber, Paginator};
use crate::ports::{Cache, GroupRepository, PostFilter, PostRepository, Renderer, UserRepository, View};

use super::entries::EntryLoader;
use super::follow::FollowGraph;

/// Cache keys of rendered home pages start with this.
pub const HOME_CACHE_PREFIX: &str = "feed:home:page:";

/// Highest page number whose rendering is cached. Requests outside
/// `1..=HOME_CACHE_MAX_PAGE` are rendered fresh every time.
pub const HOME_CACHE_MAX_PAGE: i64 = 50;

/// Posts filed under one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page_obj: Page<PostEntry>,
}

/// Posts by one author, seen by a possibly anonymous viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: AuthorRef,
    pub post_count: usize,
    pub following: bool,
    pub page_obj: Page<PostEntry>,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    follow_graph: FollowGraph,
    entries: EntryLoader,
    cache: Arc<dyn Cache>,
    renderer: Arc<dyn Renderer>,
    paginator: Paginator,
    home_cache_ttl: Duration,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        follow_graph: FollowGraph,
        cache: Arc<dyn Cache>,
        renderer: Arc<dyn Renderer>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            entries: EntryLoader::new(users.clone(), groups.clone()),
            posts,
            users,
            groups,
            follow_graph,
            cache,
            renderer,
            paginator: Paginator::new(config.page_size),
            home_cache_ttl: config.home_cache_ttl,
        }
    }

    /// All posts, newest first.
    pub async fn home_feed(&self, page: PageNumber) -> Result<Page<PostEntry>, DomainError> {
        self.page_of(&PostFilter::All, page).await
    }

    /// Posts of the group with `slug`, newest first.
    pub async fn group_feed(&self, slug: &str, page: PageNumber) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        let page_obj = self.page_of(&PostFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page_obj })
    }

    /// Posts by `username`, newest first, with the viewer's follow state.
    pub async fn profile_feed(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: PageNumber,
    ) -> Result<ProfileFeed, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let following = match viewer {
            Some(viewer_id) => self.follow_graph.is_following(viewer_id, author.id).await?,
            None => false,
        };

        let page_obj = self.page_of(&PostFilter::Author(author.id), page).await?;
        Ok(ProfileFeed {
            author: AuthorRef {
                id: author.id,
                username: author.username,
            },
            post_count: page_obj.total,
            following,
            page_obj,
        })
    }

    /// Posts by every author `viewer` follows, newest first.
    pub async fn following_feed(
        &self,
        viewer: Uuid,
        page: PageNumber,
    ) -> Result<Page<PostEntry>, DomainError> {
        let authors = self.follow_graph.following_author_ids(viewer).await?;
        self.page_of(&PostFilter::Authors(authors), page).await
    }

    /// Rendered home page, served from cache while the entry is fresh.
    ///
    /// A fresh entry is returned as-is even if posts were written since it
    /// was stored; new posts show up once it expires or the cache is cleared.
    pub async fn render_home(&self, page: PageNumber) -> Result<String, DomainError> {
        let Some(key) = home_cache_key(page) else {
            tracing::debug!(page = page.get(), "Home feed page outside cached range");
            return self.render_home_page(page).await;
        };

        if let Some(body) = self.cache.get(&key).await {
            tracing::debug!(%key, "Home feed cache hit");
            return Ok(body);
        }

        tracing::debug!(%key, "Home feed cache miss");
        let body = self.render_home_page(page).await?;

        if let Err(e) = self.cache.set(&key, &body, Some(self.home_cache_ttl)).await {
            tracing::warn!(%key, error = %e, "Failed to cache home feed");
        }

        Ok(body)
    }

    async fn render_home_page(&self, page: PageNumber) -> Result<String, DomainError> {
        let page_obj = self.home_feed(page).await?;
        Ok(self
            .renderer
            .render(View::Index, &json!({ "page_obj": page_obj }))?)
    }

    pub async fn render_group(&self, slug: &str, page: PageNumber) -> Result<String, DomainError> {
        let feed = self.group_feed(slug, page).await?;
        self.render(View::GroupList, &feed)
    }

    pub async fn render_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: PageNumber,
    ) -> Result<String, DomainError> {
        let feed = self.profile_feed(username, viewer, page).await?;
        self.render(View::Profile, &feed)
    }

    pub async fn render_following(
        &self,
        viewer: Uuid,
        page: PageNumber,
    ) -> Result<String, DomainError> {
        let page_obj = self.following_feed(viewer, page).await?;
        self.renderer
            .render(View::Follow, &json!({ "page_obj": page_obj }))
            .map_err(Into::into)
    }

    /// Drop every cached rendering.
    pub async fn clear_cache(&self) -> Result<(), DomainError> {
        self.cache.clear().await?;
        Ok(())
    }

    fn render<T: Serialize>(&self, view: View, context: &T) -> Result<String, DomainError> {
        let context = serde_json::to_value(context)
            .map_err(|e| DomainError::Internal(format!("context for {}: {e}", view.name())))?;
        Ok(self.renderer.render(view, &context)?)
    }

    async fn page_of(
        &self,
        filter: &PostFilter,
        page: PageNumber,
    ) -> Result<Page<PostEntry>, DomainError> {
        if let PostFilter::Authors(ids) = filter {
            if ids.is_empty() {
                return Ok(self.paginator.paginate(Vec::new(), page));
            }
        }

        let total = self.posts.count(filter).await?;
        let window = self.paginator.window(total, page);
        let posts = if window.limit == 0 {
            Vec::new()
        } else {
            self.posts.list(filter, window.offset, window.limit).await?
        };

        Ok(window.into_page(self.entries.posts(posts).await?))
    }
}

fn home_cache_key(page: PageNumber) -> Option<String> {
    (1..=HOME_CACHE_MAX_PAGE)
        .contains(&page.get())
        .then(|| format!("{HOME_CACHE_PREFIX}{}", page.get()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_cache_key_only_for_cached_range() {
        assert_eq!(
            home_cache_key(PageNumber::FIRST).as_deref(),
            Some("feed:home:page:1")
        );
        assert!(home_cache_key(PageNumber::new(HOME_CACHE_MAX_PAGE)).is_some());
        assert!(home_cache_key(PageNumber::new(HOME_CACHE_MAX_PAGE + 1)).is_none());
        assert!(home_cache_key(PageNumber::new(0)).is_none());
        assert!(home_cache_key(PageNumber::new(-3)).is_none());
    }
}
