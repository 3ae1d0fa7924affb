use uuid::Uuid;

use super::Permission;

/// Authenticated caller, as decoded from the request's bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_superuser: bool,
    /// Raw permission codenames, e.g. `circuits.change_provider`.
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_perm(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == permission.codename())
    }
}
