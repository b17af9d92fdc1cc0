// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions a user is permitted to perform. They are
//! advisory only and do not replace backend authorization checks.

use pcinv_domain::Role;
use pcinv_persistence::UserData;

use crate::auth::AuthenticatedActor;
use crate::request_response::{Capability, GlobalCapabilities, UserCapabilities};

/// Computes global capabilities for an authenticated user.
///
/// Staff keep the everyday inventory actions. Everything structural or
/// destructive is reserved for admins.
#[must_use]
pub const fn compute_global_capabilities(actor: &AuthenticatedActor) -> GlobalCapabilities {
    let admin: bool = matches!(actor.role, Role::Admin);
    GlobalCapabilities {
        can_edit_hardware: Capability::Allowed,
        can_export: Capability::Allowed,
        can_manage_categories: Capability::from_bool(admin),
        can_delete_hardware: Capability::from_bool(admin),
        can_view_deleted: Capability::from_bool(admin),
        can_import_csv: Capability::from_bool(admin),
        can_manage_users: Capability::from_bool(admin),
        can_backup: Capability::from_bool(admin),
    }
}

/// Computes what an actor may do to one specific user account.
///
/// # Arguments
///
/// * `actor` - The authenticated actor
/// * `target` - The user being acted on
/// * `admin_count` - The number of admin accounts in the system
///
/// Nobody may delete their own account, and the last admin can be neither
/// deleted nor demoted.
#[must_use]
pub fn compute_user_capabilities(
    actor: &AuthenticatedActor,
    target: &UserData,
    admin_count: i64,
) -> UserCapabilities {
    if !actor.is_admin() {
        return UserCapabilities {
            can_edit: Capability::Denied,
            can_delete: Capability::Denied,
            can_reset_password: Capability::Denied,
            can_change_role: Capability::Denied,
        };
    }

    let is_self: bool = target.user_id == actor.user_id;
    let is_last_admin: bool = target.role == Role::Admin.as_str() && admin_count <= 1;

    UserCapabilities {
        can_edit: Capability::Allowed,
        can_delete: Capability::from_bool(!is_self && !is_last_admin),
        can_reset_password: Capability::Allowed,
        can_change_role: Capability::from_bool(!is_last_admin),
    }
}
