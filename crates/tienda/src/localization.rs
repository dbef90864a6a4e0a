//! JSON-file string localization.
//!
//! Translations live in one flat JSON object per locale,
//! `<dir>/<locale>.json`. Lookups go through the byte cache first so hot
//! strings skip the filesystem; a translation that cannot be found
//! resolves to its own key.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use tienda_core::cache::{locale_key, Cache};

pub struct JsonLocalizer<C: Cache> {
    dir: PathBuf,
    cache: Arc<C>,
}

impl<C: Cache> JsonLocalizer<C> {
    pub fn new(dir: impl Into<PathBuf>, cache: Arc<C>) -> Self {
        Self {
            dir: dir.into(),
            cache,
        }
    }

    /// The translation for `key` in `locale`, or `key` itself when no
    /// translation exists.
    pub async fn get(&self, locale: &str, key: &str) -> String {
        let cache_key = locale_key(locale, key);

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => {
                if let Ok(s) = String::from_utf8(bytes) {
                    return s;
                }
                tracing::warn!(key = %cache_key, "cached translation is not valid utf-8");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = %cache_key, error = %err, "translation cache read failed");
            }
        }

        let Some(translation) = self.lookup_file(locale, key).await else {
            return key.to_string();
        };

        if let Err(err) = self
            .cache
            .set(&cache_key, translation.as_bytes(), None)
            .await
        {
            tracing::warn!(key = %cache_key, error = %err, "failed to cache translation");
        }
        translation
    }

    /// Like [`JsonLocalizer::get`], with `{0}`, `{1}`, ... replaced by
    /// `args` in order.
    pub async fn format(&self, locale: &str, key: &str, args: &[&str]) -> String {
        let mut message = self.get(locale, key).await;
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }

    async fn lookup_file(&self, locale: &str, key: &str) -> Option<String> {
        let path = self.dir.join(format!("{locale}.json"));
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no translation file");
                return None;
            }
        };

        let map: Value = match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "malformed translation file");
                return None;
            }
        };

        map.get(key).and_then(Value::as_str).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;

    fn write_locale(dir: &std::path::Path, locale: &str, body: &str) {
        std::fs::write(dir.join(format!("{locale}.json")), body).unwrap();
    }

    fn localizer(dir: &std::path::Path) -> (JsonLocalizer<MemoryCache>, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new(100));
        (JsonLocalizer::new(dir, cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_get_reads_translation_from_file() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(dir.path(), "en-US", r#"{"greeting": "Hello"}"#);
        let (localizer, _) = localizer(dir.path());

        assert_eq!(localizer.get("en-US", "greeting").await, "Hello");
    }

    #[tokio::test]
    async fn test_missing_translation_resolves_to_key() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(dir.path(), "en-US", r#"{"greeting": "Hello"}"#);
        let (localizer, _) = localizer(dir.path());

        assert_eq!(localizer.get("en-US", "farewell").await, "farewell");
    }

    #[tokio::test]
    async fn test_missing_locale_file_resolves_to_key() {
        let dir = tempfile::tempdir().unwrap();
        let (localizer, _) = localizer(dir.path());

        assert_eq!(localizer.get("xx-XX", "greeting").await, "greeting");
    }

    #[tokio::test]
    async fn test_hit_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(dir.path(), "en-US", r#"{"greeting": "Hello"}"#);
        let (localizer, cache) = localizer(dir.path());

        assert_eq!(localizer.get("en-US", "greeting").await, "Hello");

        // Rewrite the file; the cached translation still wins.
        write_locale(dir.path(), "en-US", r#"{"greeting": "Howdy"}"#);
        assert_eq!(localizer.get("en-US", "greeting").await, "Hello");

        // Until it is evicted.
        cache.delete(&locale_key("en-US", "greeting")).await.unwrap();
        assert_eq!(localizer.get("en-US", "greeting").await, "Howdy");
    }

    #[tokio::test]
    async fn test_locales_do_not_bleed() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(dir.path(), "en-US", r#"{"greeting": "Hello"}"#);
        write_locale(dir.path(), "es-UY", r#"{"greeting": "Hola"}"#);
        let (localizer, _) = localizer(dir.path());

        assert_eq!(localizer.get("en-US", "greeting").await, "Hello");
        assert_eq!(localizer.get("es-UY", "greeting").await, "Hola");
    }

    #[tokio::test]
    async fn test_format_substitutes_positional_args() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            r#"{"identity.registered": "User {0} registered on tenant {1}."}"#,
        );
        let (localizer, _) = localizer(dir.path());

        let message = localizer
            .format("en-US", "identity.registered", &["jdoe", "acme"])
            .await;

        assert_eq!(message, "User jdoe registered on tenant acme.");
    }
}
