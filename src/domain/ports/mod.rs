use crate::domain::models::{manager::Manager, user::User};
use crate::error::AppError;
use async_trait::async_trait;

/// Keyed access to user records. Lookups by id, phone and manager only see
/// active rows; `list_all` returns deactivated history as well.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_mob(&self, mob_num: &str) -> Result<Option<User>, AppError>;
    async fn list_by_manager(&self, manager_id: &str) -> Result<Vec<User>, AppError>;
    async fn list_all(&self) -> Result<Vec<User>, AppError>;
    /// Writes name, phone, tax id, manager and `updated_at` for `user.user_id`.
    async fn update(&self, user: &User) -> Result<User, AppError>;
    /// Soft-deactivates `previous_id` and inserts `successor` atomically.
    /// Fails with `NotFound` when `previous_id` is no longer active.
    async fn fork(&self, previous_id: &str, successor: &User) -> Result<User, AppError>;
    async fn delete_by_id(&self, user_id: &str) -> Result<(), AppError>;
    /// Removes every row carrying this phone number, historical ones included.
    async fn delete_by_mob(&self, mob_num: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ManagerRepository: Send + Sync {
    /// Returns the manager only while it is active.
    async fn find_by_id(&self, manager_id: &str) -> Result<Option<Manager>, AppError>;
}
