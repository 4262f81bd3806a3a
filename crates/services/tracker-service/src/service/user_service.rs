//! User service - Handles user-related business logic.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use common::{OptionExt, Paginated, PaginationParams};
use domain::{Caller, Password, UserRole, ENTITY_USER, MSG_EMAIL_TAKEN};
use persistence::entities::user;
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{conflict_as, ServiceError, ServiceResult};

/// Input for [`UserService::create_user`]
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Plain text; hashed before it is stored
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// Input for [`UserService::update_user`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<String>,
}

/// User service trait for dependency injection.
///
/// Soft-deleted users are never returned.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> ServiceResult<user::Model>;

    async fn list_users(&self) -> ServiceResult<Vec<user::Model>>;

    async fn list_users_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<user::Model>>;

    /// Register a user; the email is unique among live users
    async fn create_user(&self, input: CreateUser) -> ServiceResult<user::Model>;

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> ServiceResult<user::Model>;

    /// Soft delete user
    async fn delete_user(&self, id: Uuid) -> ServiceResult<()>;
}

/// Concrete implementation of UserService using a unit of work per call.
pub struct UserManager {
    persistence: Persistence,
    caller: Caller,
}

impl UserManager {
    pub fn new(persistence: Persistence, caller: Caller) -> Self {
        Self {
            persistence,
            caller,
        }
    }

    fn uow(&self) -> UnitOfWork {
        self.persistence.unit_of_work(&self.caller)
    }

    async fn load(&self, uow: &UnitOfWork, id: Uuid) -> ServiceResult<user::Model> {
        Ok(uow.users().get_by_id(id).await?.ok_or_not_found(ENTITY_USER)?)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> ServiceResult<user::Model> {
        self.load(&self.uow(), id).await
    }

    async fn list_users(&self) -> ServiceResult<Vec<user::Model>> {
        Ok(self.uow().users().get_all().await?)
    }

    async fn list_users_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<user::Model>> {
        Ok(self.uow().users().get_paged(params.normalize()).await?)
    }

    async fn create_user(&self, input: CreateUser) -> ServiceResult<user::Model> {
        let uow = self.uow();
        let email = input.email.trim().to_lowercase();

        if uow.users().any(|u| u.email == email).await? {
            tracing::warn!(%email, "Precondition failed: email taken");
            return Err(ServiceError::conflict(MSG_EMAIL_TAKEN));
        }

        let password = Password::new(&input.password).map_err(|e| {
            tracing::warn!(reason = %e, "Precondition failed: password rejected");
            ServiceError::from(e)
        })?;

        let mut user = user::Model::new(input.first_name, input.last_name, &email, password);
        user.phone_number = input.phone_number;
        user.department = input.department;
        user.role = input.role.to_string();

        let user = uow.users().add(user);
        uow.save_changes().await.map_err(conflict_as(MSG_EMAIL_TAKEN))?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> ServiceResult<user::Model> {
        let uow = self.uow();
        let mut user = self.load(&uow, id).await?;

        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if input.phone_number.is_some() {
            user.phone_number = input.phone_number;
        }
        if input.department.is_some() {
            user.department = input.department;
        }

        let user = uow.users().update(user);
        uow.save_changes().await?;

        tracing::info!(user_id = %id, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> ServiceResult<()> {
        let uow = self.uow();
        let user = self.load(&uow, id).await?;

        uow.users().remove(user);
        uow.save_changes().await?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
