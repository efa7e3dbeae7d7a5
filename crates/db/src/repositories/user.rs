//! User repository.
//!
//! Stores credentials as an opaque hash; hashing and verification happen
//! outside this system.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ledgerbook_core::ledger::{EntityKind, LedgerError};
use ledgerbook_shared::types::UserId;

use crate::entities::sea_orm_active_enums::{UserRole, UserStatus};
use crate::entities::users;

use super::reference::map_db_err;

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct UserInput {
    /// Display name.
    pub name: String,
    /// Sign-in email; unique.
    pub email: String,
    /// Opaque credential hash.
    pub password_hash: String,
    /// Role; defaults to staff.
    pub role: Option<UserRole>,
    /// Status; defaults to active.
    pub status: Option<UserStatus>,
}

/// Input for updating a user; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New status.
    pub status: Option<UserStatus>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the insert fails,
    /// including a unique violation on the email.
    pub async fn create(&self, input: UserInput) -> Result<users::Model, LedgerError> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role: Set(input.role.unwrap_or(UserRole::Staff)),
            status: Set(input.status.unwrap_or(UserStatus::Active)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user.insert(&self.db).await.map_err(map_db_err)
    }

    /// Lists all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, LedgerError> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<users::Model>, LedgerError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, LedgerError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Updates a user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the user does not exist,
    /// or [`LedgerError::PersistenceFailure`] when the write fails.
    pub async fn update(&self, id: Uuid, input: UserUpdate) -> Result<users::Model, LedgerError> {
        let user = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::User,
            id,
        })?;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the user does not exist, or
    /// [`LedgerError::PersistenceFailure`] when the delete fails, including
    /// the foreign-key rejection while transactions or lines still
    /// reference the user.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let user = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::User,
            id,
        })?;

        users::Entity::delete_by_id(user.id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
