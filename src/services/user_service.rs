use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{found, ServiceContext};
use crate::auth::hash_password;
use crate::database::models::{User, UserFilter};
use crate::error::ApiError;
use crate::events::DomainEvent;
use crate::types::{Role, UserStatus};
use crate::validation::inputs::{AdminUpdateUserInput, CreateAdminInput};
use crate::validation::parse;

/// Account administration for admins.
#[derive(Clone)]
pub struct UserService {
    ctx: ServiceContext,
}

impl UserService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, ApiError> {
        Ok(self.ctx.store.list_users(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        found(self.ctx.store.get_user(id).await?, "User", id)
    }

    /// Seed an approved ADMIN account. Admins cannot self-register.
    pub async fn create_admin(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let input: CreateAdminInput = parse(json!({ "email": email, "password": password }))?;
        let email = input.email.to_lowercase();
        if self.ctx.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict(format!("A user with email {} already exists", email)));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: hash_password(&input.password)?,
            role: Role::Admin,
            status: UserStatus::Approved,
            created_at: now,
            updated_at: now,
        };
        self.ctx.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, "Admin account created");

        self.ctx
            .publish(DomainEvent::UserRegistered {
                user_id: user.id,
                role: user.role,
                status: user.status,
            })
            .await?;
        Ok(user)
    }

    pub async fn update(&self, input: AdminUpdateUserInput) -> Result<User, ApiError> {
        let mut user = self.get(input.id).await?;
        let before = (user.role, user.status);
        // LANDLORD and BOARDER each own a profile row
        if input.role.is_some_and(|role| role != user.role) {
            return Err(ApiError::invalid_field(
                "role",
                format!("Role cannot change from {}", user.role),
            ));
        }

        if let Some(email) = input.email {
            user.email = email.to_lowercase();
        }
        if let Some(password) = input.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(status) = input.status {
            user.status = status;
        }
        user.updated_at = Utc::now();

        self.ctx.store.update_user(&user).await?;
        if before != (user.role, user.status) {
            tracing::info!(
                user_id = %user.id,
                role = %user.role,
                status = %user.status,
                "User access changed"
            );
        }

        self.ctx
            .publish(DomainEvent::UserUpdated {
                user_id: user.id,
                role: user.role,
                status: user.status,
            })
            .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::database::{MemoryStore, Store};
    use crate::events::RecordingEventBus;
    use crate::validation::parse_with_id;
    use serde_json::json;
    use std::sync::Arc;

    async fn fixture() -> (UserService, User) {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
            password_hash: hash_password("original-pass").unwrap(),
            role: Role::Landlord,
            status: UserStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        store.insert_user(&user).await.unwrap();
        let service = UserService::new(ServiceContext::new(store, Arc::new(RecordingEventBus::new())));
        (service, user)
    }

    #[tokio::test]
    async fn approve_and_reset_password() {
        let (service, user) = fixture().await;
        let input = parse_with_id(
            &user.id.to_string(),
            json!({ "status": "APPROVED", "password": "brand-new-pass" }),
        )
        .unwrap();

        let updated = service.update(input).await.unwrap();

        assert_eq!(updated.status, UserStatus::Approved);
        assert!(verify_password("brand-new-pass", &updated.password_hash));
        assert!(!verify_password("original-pass", &updated.password_hash));
    }

    #[tokio::test]
    async fn filter_by_status() {
        let (service, _) = fixture().await;
        let pending = service
            .list(&UserFilter {
                status: Some(UserStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        let admins = service
            .list(&UserFilter {
                role: Some(Role::Admin),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(admins.is_empty());
    }

    #[tokio::test]
    async fn create_admin_is_approved_and_unique() {
        let (service, _) = fixture().await;
        let admin = service.create_admin(" Root@Example.com ", "admin-pass-1").await.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.status, UserStatus::Approved);

        let again = service.create_admin("root@example.com", "admin-pass-1").await.unwrap_err();
        assert_eq!(again.kind(), "CONFLICT");
        let short = service.create_admin("other@example.com", "short").await.unwrap_err();
        assert!(short.field_errors().unwrap().contains_key("password"));
        let bad = service.create_admin("root@", "admin-pass-1").await.unwrap_err();
        assert!(bad.field_errors().unwrap().contains_key("email"));
    }

    #[tokio::test]
    async fn role_cannot_change() {
        let (service, user) = fixture().await;

        let input = parse_with_id(&user.id.to_string(), json!({ "role": "BOARDER", "status": "APPROVED" })).unwrap();
        let err = service.update(input).await.unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("role"));
        let stored = service.get(user.id).await.unwrap();
        assert_eq!((stored.role, stored.status), (Role::Landlord, UserStatus::Pending));

        let input = parse_with_id(&user.id.to_string(), json!({ "role": "LANDLORD", "status": "APPROVED" })).unwrap();
        assert_eq!(service.update(input).await.unwrap().status, UserStatus::Approved);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (service, _) = fixture().await;
        assert_eq!(service.get(Uuid::new_v4()).await.unwrap_err().kind(), "NOT_FOUND");
    }
}
