//! Shared application state.
//!
//! Cloned into every request handler. Each handler gets its own unit of
//! work via [`AppState::repository`]; the cache, identity service, and
//! localizer are shared.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::cache::AppCache;
use crate::config::Config;
use crate::identity::{IdentityService, LogMailer, MailQueue, SqliteUserStore};
use crate::localization::JsonLocalizer;
use crate::storage::{CachedRepository, SqliteStore};

#[derive(Clone)]
pub struct AppState {
    /// Committed store; handlers derive fresh units of work from it.
    pub store: SqliteStore,
    /// Cache backend shared by the repository facade and the localizer.
    pub cache: Arc<AppCache>,
    /// Identity flows (registration, confirmation, password reset).
    pub identity: Arc<IdentityService<SqliteUserStore, AppCache>>,
    /// Localized user-facing strings.
    pub localizer: Arc<JsonLocalizer<AppCache>>,
    /// Public base URL for links sent by mail.
    pub public_url: Url,
    cache_ttl: Duration,
    invalidate_on_update: bool,
}

impl AppState {
    fn build(store: SqliteStore, cache: Arc<AppCache>, config: &Config) -> anyhow::Result<Self> {
        let public_url = Url::parse(&config.public_url)?;
        let localizer = Arc::new(JsonLocalizer::new(
            config.localization_dir.clone(),
            cache.clone(),
        ));
        let identity = Arc::new(IdentityService::new(
            SqliteUserStore::new(store.clone()),
            localizer.clone(),
            MailQueue::start(LogMailer),
            config.email_verification_required,
        ));

        Ok(Self {
            store,
            cache,
            identity,
            localizer,
            public_url,
            cache_ttl: config.cache_ttl(),
            invalidate_on_update: config.invalidate_on_update,
        })
    }

    /// A fresh unit of work wrapped with the cache-aside facade.
    ///
    /// Staged writes are private to the returned repository until its
    /// `save_changes` commits them.
    pub fn repository(&self) -> CachedRepository<SqliteStore, AppCache> {
        CachedRepository::new(self.store.unit_of_work(), self.cache.clone(), self.cache_ttl)
            .with_update_invalidation(self.invalidate_on_update)
    }
}

#[cfg(feature = "memory")]
mod sqlite_memory {
    use super::*;

    impl AppState {
        /// Creates AppState with SQLite storage and an in-memory cache.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = SqliteStore::new(&config.sqlite_path).await?;
            let cache = Arc::new(AppCache::new(config.cache_max_entries));
            Self::build(store, cache, config)
        }
    }
}

#[cfg(feature = "redis")]
mod sqlite_redis {
    use super::*;

    impl AppState {
        /// Creates AppState with SQLite storage and a Redis cache.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = SqliteStore::new(&config.sqlite_path).await?;
            let cache = Arc::new(AppCache::new(&config.redis_url, config.cache_ttl()).await?);
            Self::build(store, cache, config)
        }
    }
}

#[cfg(all(test, feature = "memory"))]
mod test_support {
    use super::*;

    impl AppState {
        /// In-memory SQLite plus memory cache, for router tests.
        ///
        /// Email verification is off so registration completes in one
        /// request; the confirmation flows are covered by the identity
        /// service tests.
        pub async fn for_tests() -> Self {
            let config = Config {
                cache_ttl_seconds: 300,
                cache_max_entries: 1024,
                sqlite_path: ":memory:".to_string(),
                redis_url: "redis://localhost:6379".to_string(),
                localization_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/localization").to_string(),
                invalidate_on_update: false,
                email_verification_required: false,
                public_url: "http://localhost:3000/".to_string(),
            };

            let store = SqliteStore::new_in_memory().await.unwrap();
            let cache = Arc::new(AppCache::new(config.cache_max_entries));
            Self::build(store, cache, &config).unwrap()
        }
    }
}
