use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "tienda.db")
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Directory holding per-locale translation files (default: "localization")
    pub localization_dir: String,
    /// Evict an entity's cached DTO when it is updated (default: false).
    /// Off, an updated entity's cached DTO stays stale until its TTL expires.
    pub invalidate_on_update: bool,
    /// Require email confirmation before new accounts become active
    /// (default: true)
    pub email_verification_required: bool,
    /// Public base URL used to build confirmation links sent by mail
    /// (default: "http://localhost:3000/")
    pub public_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "tienda.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `LOCALIZATION_DIR` - Translation file directory (default: "localization")
    /// - `INVALIDATE_ON_UPDATE` - Evict cached DTOs on update (default: false)
    /// - `EMAIL_VERIFICATION_REQUIRED` - Gate new accounts on email
    ///   confirmation (default: true)
    /// - `PUBLIC_URL` - Base URL for mailed links (default: "http://localhost:3000/")
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "tienda.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            localization_dir: env::var("LOCALIZATION_DIR")
                .unwrap_or_else(|_| "localization".to_string()),
            invalidate_on_update: env::var("INVALIDATE_ON_UPDATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            email_verification_required: env::var("EMAIL_VERIFICATION_REQUIRED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000/".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            cache_ttl_seconds: 600,
            cache_max_entries: 10_000,
            sqlite_path: "test.db".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            localization_dir: "localization".to_string(),
            invalidate_on_update: false,
            email_verification_required: true,
            public_url: "http://localhost:3000/".to_string(),
        }
    }

    #[test]
    fn test_cache_ttl_conversion() {
        let config = base_config();
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_default_values() {
        env::remove_var("CACHE_TTL_SECONDS");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("SQLITE_PATH");
        env::remove_var("REDIS_URL");
        env::remove_var("LOCALIZATION_DIR");
        env::remove_var("INVALIDATE_ON_UPDATE");
        env::remove_var("EMAIL_VERIFICATION_REQUIRED");
        env::remove_var("PUBLIC_URL");

        let config = Config::from_env();

        assert_eq!(config.cache_ttl_seconds, 300);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.sqlite_path, "tienda.db");
        assert_eq!(config.localization_dir, "localization");
        assert!(!config.invalidate_on_update);
        assert!(config.email_verification_required);
        assert_eq!(config.public_url, "http://localhost:3000/");
    }
}
