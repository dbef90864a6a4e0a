//! User persistence for the identity service.
//!
//! [`UserStore`] is the seam the service is tested through. The
//! production implementation runs tenant-scoped raw SQL against the
//! SQLite entity store, so every lookup is partition-safe by
//! construction.

use async_trait::async_trait;
use rusqlite::types::Value;
use uuid::Uuid;

use tienda_core::identity::{IdentityError, Result, User};
use tienda_core::tenant::TenantId;

use crate::storage::{EntityStore, SqliteStore, Table};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, tenant: &TenantId, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, tenant: &TenantId, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, tenant: &TenantId, email: &str) -> Result<Option<User>>;
    async fn find_by_phone(&self, tenant: &TenantId, phone: &str) -> Result<Option<User>>;
    async fn insert(&self, user: &User) -> Result<()>;
    async fn update(&self, user: &User) -> Result<()>;
}

pub struct SqliteUserStore {
    store: SqliteStore,
}

impl SqliteUserStore {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    fn select(filter: &str) -> String {
        format!(
            "SELECT {} FROM users WHERE tenant_id = @tenantId AND {}",
            User::COLUMNS.join(", "),
            filter
        )
    }

    async fn find_one(
        &self,
        tenant: &TenantId,
        filter: &str,
        params: Vec<(&'static str, Value)>,
    ) -> Result<Option<User>> {
        let rows: Vec<User> = self
            .store
            .query(&Self::select(filter), params, tenant)
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, tenant: &TenantId, id: Uuid) -> Result<Option<User>> {
        self.find_one(
            tenant,
            "id = @id",
            vec![("@id", Value::Text(id.to_string()))],
        )
        .await
    }

    async fn find_by_username(&self, tenant: &TenantId, username: &str) -> Result<Option<User>> {
        self.find_one(
            tenant,
            "username = @username",
            vec![("@username", Value::Text(username.to_string()))],
        )
        .await
    }

    async fn find_by_email(&self, tenant: &TenantId, email: &str) -> Result<Option<User>> {
        self.find_one(
            tenant,
            "email = @email",
            vec![("@email", Value::Text(email.to_string()))],
        )
        .await
    }

    async fn find_by_phone(&self, tenant: &TenantId, phone: &str) -> Result<Option<User>> {
        self.find_one(
            tenant,
            "phone_number = @phone",
            vec![("@phone", Value::Text(phone.to_string()))],
        )
        .await
    }

    async fn insert(&self, user: &User) -> Result<()> {
        let uow = self.store.unit_of_work();
        uow.stage_insert(user)
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        uow.save_changes()
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let uow = self.store.unit_of_work();
        uow.stage_update(user)
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        uow.save_changes()
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(tenant: &str, username: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: TenantId::new(tenant),
            username: username.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone_number: Some("555-0100".to_string()),
            password_hash: "hash".to_string(),
            is_active: true,
            email_confirmed: false,
            phone_confirmed: false,
            email_token: None,
            phone_token: None,
            reset_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn store_with(users: &[User]) -> SqliteUserStore {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let uow = store.unit_of_work();
        for user in users {
            uow.stage_insert(user).unwrap();
        }
        uow.save_changes().await.unwrap();
        SqliteUserStore::new(store)
    }

    #[tokio::test]
    async fn test_lookups_are_tenant_scoped() {
        let acme = test_user("acme", "jdoe", "jane@acme.example");
        let globex = test_user("globex", "jdoe", "jane@globex.example");
        let users = store_with(&[acme.clone(), globex.clone()]).await;

        let found = users
            .find_by_username(&TenantId::new("acme"), "jdoe")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, acme.id);

        let found = users
            .find_by_email(&TenantId::new("globex"), "jane@globex.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, globex.id);

        let missing = users
            .find_by_email(&TenantId::new("acme"), "jane@globex.example")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_respects_tenant() {
        let user = test_user("acme", "jdoe", "jane@acme.example");
        let users = store_with(std::slice::from_ref(&user)).await;

        assert!(users
            .find_by_id(&TenantId::new("acme"), user.id)
            .await
            .unwrap()
            .is_some());
        assert!(users
            .find_by_id(&TenantId::new("globex"), user.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_insert_then_update_round_trips() {
        let mut user = test_user("acme", "jdoe", "jane@acme.example");
        let users = store_with(&[]).await;

        users.insert(&user).await.unwrap();

        user.email_confirmed = true;
        user.reset_token = Some("tok".to_string());
        users.update(&user).await.unwrap();

        let found = users
            .find_by_id(&TenantId::new("acme"), user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(found.email_confirmed);
        assert_eq!(found.reset_token.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_duplicate_username_same_tenant_rejected() {
        let user = test_user("acme", "jdoe", "jane@acme.example");
        let users = store_with(std::slice::from_ref(&user)).await;

        let mut dup = test_user("acme", "jdoe", "other@acme.example");
        dup.phone_number = None;
        let err = users.insert(&dup).await.unwrap_err();

        assert!(matches!(err, IdentityError::Storage(_)));
    }

    #[tokio::test]
    async fn test_same_username_across_tenants_allowed() {
        let user = test_user("acme", "jdoe", "jane@acme.example");
        let users = store_with(std::slice::from_ref(&user)).await;

        let twin = test_user("globex", "jdoe", "jane@globex.example");
        users.insert(&twin).await.unwrap();
    }
}
