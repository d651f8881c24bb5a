//! User repository port.

use async_trait::async_trait;

use parley_core::result::AppResult;
use parley_core::types::id::UserId;
use parley_entity::user::User;

/// Read/write access to user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Insert or replace a user.
    async fn insert_user(&self, user: User) -> AppResult<User>;
}
