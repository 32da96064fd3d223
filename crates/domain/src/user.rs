//! Staff account types.

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;
use crate::security::{Permission, Role, default_permissions_for};

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    ///
    /// Structural validation only: exactly one `@`, non-empty local part and a
    /// domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// A staff account.
///
/// Only the role and an optional layer of custom grants are stored. The
/// effective grant list is derived from them on every authorization check, so a
/// role change takes effect immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: NonEmptyString,
    display_name: NonEmptyString,
    email: EmailAddress,
    role: Role,
    custom_grants: Vec<Permission>,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an active account with no custom grants.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        display_name: impl Into<String>,
        email: EmailAddress,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let username: String = username.into();

        Ok(Self {
            id,
            username: NonEmptyString::new(username.trim())?,
            display_name: NonEmptyString::new(display_name)?,
            email,
            role,
            custom_grants: Vec::new(),
            is_active: true,
            created_at,
            last_login: None,
        })
    }

    /// Returns the account with `grants` layered on top of its role defaults.
    #[must_use]
    pub fn with_custom_grants(mut self, grants: Vec<Permission>) -> Self {
        self.custom_grants = grants;
        self
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the sign-in name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the per-account grants added on top of the role defaults.
    #[must_use]
    pub fn custom_grants(&self) -> &[Permission] {
        &self.custom_grants
    }

    /// Returns whether the account may sign in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last sign-in timestamp, if any.
    #[must_use]
    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    /// Returns role defaults followed by custom grants.
    #[must_use]
    pub fn effective_permissions(&self) -> Vec<Permission> {
        let mut grants = default_permissions_for(self.role);
        grants.extend(self.custom_grants.iter().cloned());
        grants
    }

    /// Assigns a new role.
    pub fn assign_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Replaces the custom grant layer.
    pub fn replace_custom_grants(&mut self, grants: Vec<Permission>) {
        self.custom_grants = grants;
    }

    /// Activates or deactivates the account.
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Stamps a successful sign-in.
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }
}
