use async_trait::async_trait;
use labdesk_core::AppResult;
use labdesk_domain::{EmailAddress, User, UserId};

/// Repository port for staff accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds an account by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds an account by sign-in name.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Finds an account by email address.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Lists accounts in creation order.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Inserts or replaces an account.
    async fn save_user(&self, user: User) -> AppResult<()>;

    /// Removes an account.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;
}
