use std::sync::Arc;

use labdesk_core::{AppError, AppResult};
use labdesk_domain::{Action, LabModule, User, UserId, accessible_modules, has_permission};
use tracing::warn;

use crate::UserRepository;

/// Application service for permission checks against stored staff accounts.
///
/// Accounts are re-read on every check so role and grant changes apply
/// immediately. Missing and deactivated accounts are treated as signed out.
#[derive(Clone)]
pub struct AuthorizationService {
    users: Arc<dyn UserRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a user repository.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolves the acting account, or `None` when it is missing or deactivated.
    pub async fn resolve_actor(&self, actor: Option<UserId>) -> AppResult<Option<User>> {
        let Some(actor) = actor else {
            return Ok(None);
        };

        Ok(self
            .users
            .find_user(actor)
            .await?
            .filter(User::is_active))
    }

    /// Returns whether the actor may perform `action` on `module`.
    pub async fn has_permission(
        &self,
        actor: Option<UserId>,
        module: &str,
        action: Action,
    ) -> AppResult<bool> {
        let user = self.resolve_actor(actor).await?;
        Ok(has_permission(user.as_ref(), module, action))
    }

    /// Ensures the actor may perform `action` on `module` and returns the account.
    pub async fn require_permission(
        &self,
        actor: UserId,
        module: LabModule,
        action: Action,
    ) -> AppResult<User> {
        let Some(user) = self.resolve_actor(Some(actor)).await? else {
            warn!(actor = %actor, module = module.as_str(), "unknown or inactive actor");
            return Err(AppError::Unauthorized(format!(
                "account '{actor}' is not signed in"
            )));
        };

        if has_permission(Some(&user), module.as_str(), action) {
            return Ok(user);
        }

        warn!(
            actor = %actor,
            role = user.role().as_str(),
            module = module.as_str(),
            action = action.as_str(),
            "permission denied"
        );

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{}:{}'",
            user.username(),
            module.as_str(),
            action.as_str()
        )))
    }

    /// Lists the modules the actor can open.
    pub async fn accessible_modules(&self, actor: Option<UserId>) -> AppResult<Vec<LabModule>> {
        let user = self.resolve_actor(actor).await?;
        Ok(accessible_modules(user.as_ref()))
    }
}

/// Returns `Forbidden` unless `user` holds `action` on `module`.
///
/// For follow-up checks on an account already resolved by
/// [`AuthorizationService::require_permission`].
pub(crate) fn ensure_allowed(user: &User, module: LabModule, action: Action) -> AppResult<()> {
    if has_permission(Some(user), module.as_str(), action) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "user '{}' is missing permission '{}:{}'",
        user.username(),
        module.as_str(),
        action.as_str()
    )))
}

#[cfg(test)]
mod tests;
