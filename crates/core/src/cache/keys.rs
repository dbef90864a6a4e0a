//! Deterministic cache key derivation.
//!
//! These functions are the exposed convention: any external caller that
//! wants to invalidate a cached DTO must reproduce `entity_key` exactly.

use uuid::Uuid;

/// Returns the cache key for a single entity's DTO.
///
/// Derived from the entity type name (lowercased) and its identity.
pub fn entity_key(type_name: &str, id: Uuid) -> String {
    format!("{}:{}", type_name.to_ascii_lowercase(), id)
}

/// Returns the cache key for one localized string.
pub fn locale_key(locale: &str, key: &str) -> String {
    format!("locale:{locale}:{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key() {
        let key = entity_key("Product", Uuid::nil());
        assert_eq!(key, "product:00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_entity_key_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(entity_key("User", id), entity_key("User", id));
    }

    #[test]
    fn test_locale_key() {
        assert_eq!(
            locale_key("en-US", "identity.register.success"),
            "locale:en-US:identity.register.success"
        );
    }
}
