use super::*;

#[async_trait]
impl UserRepository for InMemoryLabRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(user_id))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .find(|_, user| user.username() == username))
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .find(|_, user| user.email() == email))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.values())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        let mut users = self.users.write().await;

        let clash = users.find(|stored_id, stored| {
            *stored_id != user.id()
                && (stored.username() == user.username() || stored.email() == user.email())
        });
        if let Some(existing) = clash {
            return Err(AppError::Conflict(format!(
                "account '{}' already uses that username or email",
                existing.username()
            )));
        }

        users.upsert(user.id(), user);
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.users
            .write()
            .await
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("staff account '{user_id}' does not exist")))
    }
}
