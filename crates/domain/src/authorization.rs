//! Pure authorization rules.

use crate::security::{Action, LabModule, Permission, Role};
use crate::user::User;

/// Returns whether `user` may perform `action` on `module`.
///
/// An absent user is denied. Admins are allowed unconditionally without
/// consulting grants. Everyone else is allowed when any effective grant names
/// the module (or [`crate::ALL_MODULES`]) and lists the action. Grants are a
/// plain union; there are no negative grants.
#[must_use]
pub fn has_permission(user: Option<&User>, module: &str, action: Action) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.role() == Role::Admin {
        return true;
    }

    grants_allow(&user.effective_permissions(), module, action)
}

/// Returns whether any grant in `grants` allows `action` on `module`.
#[must_use]
pub fn grants_allow(grants: &[Permission], module: &str, action: Action) -> bool {
    grants.iter().any(|grant| grant.allows(module, action))
}

/// Returns the modules `user` may view, in navigation order.
#[must_use]
pub fn accessible_modules(user: Option<&User>) -> Vec<LabModule> {
    LabModule::all()
        .iter()
        .copied()
        .filter(|module| has_permission(user, module.as_str(), Action::View))
        .collect()
}
