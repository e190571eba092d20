//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_core::config::{DEFAULT_HOME_CACHE_TTL, DEFAULT_PAGE_SIZE};
use quill_core::{FeedConfig, TextPolicy};

#[cfg(feature = "postgres")]
use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    #[cfg(feature = "postgres")]
    pub auto_migrate: bool,
    /// `None` selects the in-memory cache.
    pub redis_url: Option<String>,
    pub feed: FeedConfig,
    pub text_policy: TextPolicy,
    /// Users granted the `admin` role when they log in.
    pub admin_usernames: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
        });

        let defaults = TextPolicy::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            #[cfg(feature = "postgres")]
            auto_migrate: parse_var("DB_AUTO_MIGRATE", false),
            redis_url: env::var("REDIS_URL").ok(),
            feed: FeedConfig {
                page_size: parse_var("FEED_PAGE_SIZE", DEFAULT_PAGE_SIZE),
                home_cache_ttl: Duration::from_secs(parse_var(
                    "HOME_CACHE_TTL_SECS",
                    DEFAULT_HOME_CACHE_TTL.as_secs(),
                )),
            },
            text_policy: TextPolicy {
                post_sentinel: env::var("POST_TEXT_SENTINEL").unwrap_or(defaults.post_sentinel),
                comment_sentinel: env::var("COMMENT_TEXT_SENTINEL")
                    .unwrap_or(defaults.comment_sentinel),
            },
            admin_usernames: env::var("ADMIN_USERNAMES")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
