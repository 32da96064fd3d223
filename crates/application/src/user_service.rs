//! Staff account administration.
//!
//! Only administrators may create administrators, change an administrator's
//! role or grants, or hand out grants on every module. Other staff editors may
//! only hand out grants they already hold themselves, and never to their own
//! account.

use std::sync::Arc;

use labdesk_core::{AppError, AppResult};
use labdesk_domain::{
    Action, AuditAction, EmailAddress, LabModule, Permission, Role, User, UserId, has_permission,
};
use tracing::info;

use crate::{AuditEvent, AuditRepository, AuthorizationService, Clock, UserRepository};

/// Input payload for creating a staff account.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserInput {
    /// Unique sign-in name.
    pub username: String,
    /// Name shown in the interface.
    pub display_name: String,
    /// Unique email address.
    pub email: String,
    /// Initial role.
    pub role: Role,
    /// Grants layered on top of the role defaults.
    pub custom_grants: Vec<Permission>,
}

/// Application service for staff account lifecycle.
#[derive(Clone)]
pub struct UserService {
    authorization_service: AuthorizationService,
    users: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        users: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            users,
            audit_repository,
            clock,
        }
    }

    /// Lists staff accounts.
    pub async fn list_users(&self, actor: UserId) -> AppResult<Vec<User>> {
        self.authorization_service
            .require_permission(actor, LabModule::Staff, Action::View)
            .await?;

        self.users.list_users().await
    }

    /// Creates a staff account and emits an audit event.
    pub async fn create_user(&self, actor: UserId, input: CreateUserInput) -> AppResult<User> {
        let acting_user = self
            .authorization_service
            .require_permission(actor, LabModule::Staff, Action::Create)
            .await?;
        if input.role == Role::Admin {
            require_admin(&acting_user, "create an administrator")?;
        }
        ensure_grantable(&acting_user, &input.custom_grants)?;

        let email = EmailAddress::new(input.email)?;
        let username = input.username.trim().to_owned();

        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                email.as_str()
            )));
        }

        let user = User::new(
            UserId::new(),
            username,
            input.display_name,
            email,
            input.role,
            self.clock.now(),
        )?
        .with_custom_grants(input.custom_grants);

        self.users.save_user(user.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::UserCreated,
            user.id(),
            format!("created '{}' as {}", user.username(), user.role().as_str()),
        )
        .await?;

        info!(
            actor = %actor,
            user_id = %user.id(),
            role = user.role().as_str(),
            "staff account created"
        );

        Ok(user)
    }

    /// Replaces an account's role.
    pub async fn change_role(&self, actor: UserId, user_id: UserId, role: Role) -> AppResult<User> {
        let acting_user = self
            .authorization_service
            .require_permission(actor, LabModule::Staff, Action::Edit)
            .await?;
        let mut user = self.find_existing(user_id).await?;
        if role == Role::Admin || user.role() == Role::Admin {
            require_admin(&acting_user, "change an administrator role")?;
        }

        let previous = user.role();
        user.assign_role(role);
        self.users.save_user(user.clone()).await?;

        self.append_audit(
            actor,
            AuditAction::UserRoleChanged,
            user_id,
            format!(
                "changed role of '{}' from {} to {}",
                user.username(),
                previous.as_str(),
                role.as_str()
            ),
        )
        .await?;

        Ok(user)
    }

    /// Replaces an account's custom grants.
    pub async fn set_custom_grants(
        &self,
        actor: UserId,
        user_id: UserId,
        grants: Vec<Permission>,
    ) -> AppResult<User> {
        let acting_user = self
            .authorization_service
            .require_permission(actor, LabModule::Staff, Action::Edit)
            .await?;
        let mut user = self.find_existing(user_id).await?;
        if user.role() == Role::Admin {
            require_admin(&acting_user, "manage administrator grants")?;
        }
        if actor == user_id {
            require_admin(&acting_user, "change their own grants")?;
        }
        ensure_grantable(&acting_user, &grants)?;

        let grant_count = grants.len();
        user.replace_custom_grants(grants);
        self.users.save_user(user.clone()).await?;

        self.append_audit(
            actor,
            AuditAction::UserGrantsChanged,
            user_id,
            format!("set {grant_count} custom grants on '{}'", user.username()),
        )
        .await?;

        Ok(user)
    }

    /// Activates or deactivates an account.
    pub async fn set_active(
        &self,
        actor: UserId,
        user_id: UserId,
        is_active: bool,
    ) -> AppResult<User> {
        let acting_user = self
            .authorization_service
            .require_permission(actor, LabModule::Staff, Action::Edit)
            .await?;
        if actor == user_id && !is_active {
            return Err(AppError::Conflict(
                "an account cannot deactivate itself".to_owned(),
            ));
        }
        let mut user = self.find_existing(user_id).await?;
        if user.role() == Role::Admin {
            require_admin(&acting_user, "change an administrator's status")?;
        }

        user.set_active(is_active);
        self.users.save_user(user.clone()).await?;

        let verb = if is_active {
            "activated"
        } else {
            "deactivated"
        };
        self.append_audit(
            actor,
            AuditAction::UserActivationChanged,
            user_id,
            format!("{verb} '{}'", user.username()),
        )
        .await?;

        Ok(user)
    }

    /// Removes an account.
    pub async fn delete_user(&self, actor: UserId, user_id: UserId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, LabModule::Staff, Action::Delete)
            .await?;
        if actor == user_id {
            return Err(AppError::Conflict(
                "an account cannot delete itself".to_owned(),
            ));
        }

        let user = self.find_existing(user_id).await?;
        self.users.delete_user(user_id).await?;

        self.append_audit(
            actor,
            AuditAction::UserDeleted,
            user_id,
            format!("deleted '{}'", user.username()),
        )
        .await?;

        info!(actor = %actor, user_id = %user_id, "staff account deleted");
        Ok(())
    }

    /// Stamps the last sign-in time of an active account.
    pub async fn record_login(&self, user_id: UserId) -> AppResult<User> {
        let mut user = self
            .users
            .find_user(user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::Unauthorized(format!("account '{user_id}' cannot sign in")))?;

        user.record_login(self.clock.now());
        self.users.save_user(user.clone()).await?;

        self.append_audit(
            user_id,
            AuditAction::UserSignedIn,
            user_id,
            format!("'{}' signed in", user.username()),
        )
        .await?;

        Ok(user)
    }

    async fn find_existing(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("staff account '{user_id}' does not exist")))
    }

    async fn append_audit(
        &self,
        actor: UserId,
        action: AuditAction,
        user_id: UserId,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action,
                resource_id: user_id.to_string(),
                detail: Some(detail),
                recorded_at: self.clock.now(),
            })
            .await?;

        Ok(())
    }
}

fn require_admin(user: &User, what: &str) -> AppResult<()> {
    if user.role() == Role::Admin {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "only administrators may {what}"
    )))
}

/// Rejects grants the acting account could not exercise itself.
fn ensure_grantable(acting_user: &User, grants: &[Permission]) -> AppResult<()> {
    if grants.iter().any(Permission::is_wildcard) {
        require_admin(acting_user, "grant access to every module")?;
    }

    for grant in grants {
        for action in grant.actions() {
            if !has_permission(Some(acting_user), grant.module(), *action) {
                return Err(AppError::Forbidden(format!(
                    "'{}' cannot grant {}:{} without holding it",
                    acting_user.username(), grant.module(), action.as_str()
                )));
            }
        }
    }

    Ok(())
}
