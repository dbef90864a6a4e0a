//! Pure functions for mapping repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404
/// - `AlreadyExists` -> 409
/// - `UnexpectedRowCount` -> 500
/// - `MissingTenantPlaceholder` -> 400 (caller supplied unscoped SQL)
/// - `ConnectionFailed` -> 503
/// - `QueryFailed` / `Serialization` -> 500
/// - `InvalidData` -> 400
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::UnexpectedRowCount { .. } => 500,
        RepositoryError::MissingTenantPlaceholder { .. } => 400,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::not_found("Product", "abc-123");
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_already_exists_maps_to_409() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "User",
            id: "jdoe".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_unexpected_row_count_maps_to_500() {
        let error = RepositoryError::UnexpectedRowCount {
            entity_type: "Product",
            expected: 1,
            actual: 0,
        };
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_missing_tenant_placeholder_maps_to_400() {
        let error = RepositoryError::MissingTenantPlaceholder {
            entity_type: "Product",
        };
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_connection_failed_maps_to_503() {
        let error = RepositoryError::ConnectionFailed("database connection timeout".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("rate must be numeric".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }
}
