//! Tunables consumed by the core services.

use std::time::Duration;

/// Default number of posts on a feed page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default lifetime of a rendered home feed page.
pub const DEFAULT_HOME_CACHE_TTL: Duration = Duration::from_secs(20);

/// Feed assembly settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Posts per page. Fixed by configuration, never taken from the request.
    pub page_size: usize,
    /// How long a rendered home page is served from cache.
    pub home_cache_ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            home_cache_ttl: DEFAULT_HOME_CACHE_TTL,
        }
    }
}

/// Literal texts rejected as post or comment bodies.
#[derive(Debug, Clone)]
pub struct TextPolicy {
    pub post_sentinel: String,
    pub comment_sentinel: String,
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            post_sentinel: "yandex".to_string(),
            comment_sentinel: "азазазаз!!!1!1!".to_string(),
        }
    }
}
