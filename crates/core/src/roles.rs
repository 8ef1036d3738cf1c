//! Role names carried in the `role` claim of access tokens.

/// Troop administrator. Full access.
pub const ROLE_ADMIN: &str = "admin";

/// Adult leader running an outing. May edit groups and signups.
pub const ROLE_LEADER: &str = "leader";

/// Family account. Read-only access to groupings.
pub const ROLE_FAMILY: &str = "family";

/// Roles allowed to change groups, participants and outings.
pub const EDITOR_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_LEADER];

/// Whether `role` may perform mutations.
pub fn can_edit(role: &str) -> bool {
    EDITOR_ROLES.contains(&role)
}
