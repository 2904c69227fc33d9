//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role`.

/// Platform staff. Manages the public blog and reads error telemetry.
pub const ROLE_ADMIN: &str = "admin";
/// Agency owner. Manages billing, the agency profile, and its managers.
pub const ROLE_OWNER: &str = "owner";
/// Traffic manager ("gestor") working inside an agency.
pub const ROLE_GESTOR: &str = "gestor";

/// Roles an owner may assign to members of their own agency.
pub const ASSIGNABLE_ROLES: &[&str] = &[ROLE_OWNER, ROLE_GESTOR];

pub fn is_platform_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// Whether `role` may administer an agency (owners and platform admins).
pub fn can_manage_agency(role: &str) -> bool {
    role == ROLE_OWNER || role == ROLE_ADMIN
}
