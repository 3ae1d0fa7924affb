use super::{AuthError, AuthUser, Permission};

/// Entry point for permission checks
///
/// Usage:
/// ```ignore
/// Actor::new(auth_user.as_ref())
///     .can(Permission::ChangeProvider)
///     .check()?;
/// ```
pub struct Actor<'a> {
    user: Option<&'a AuthUser>,
}

impl<'a> Actor<'a> {
    /// `None` is the anonymous caller, who holds no permissions.
    pub fn new(user: Option<&'a AuthUser>) -> Self {
        Self { user }
    }

    /// Specify what permission the actor needs
    pub fn can(self, permission: Permission) -> CapabilityBuilder<'a> {
        CapabilityBuilder {
            user: self.user,
            permission,
        }
    }

    /// Non-failing variant for deciding what a page should offer.
    pub fn has(&self, permission: Permission) -> bool {
        self.user.map(|u| u.has_perm(permission)).unwrap_or(false)
    }
}

/// Builder after specifying permission
pub struct CapabilityBuilder<'a> {
    user: Option<&'a AuthUser>,
    permission: Permission,
}

impl CapabilityBuilder<'_> {
    /// Perform the authorization check
    pub fn check(self) -> Result<(), AuthError> {
        require(self.user, self.permission)
    }
}

/// Gate a handler on a single permission.
pub fn require(user: Option<&AuthUser>, permission: Permission) -> Result<(), AuthError> {
    match user {
        Some(user) if user.has_perm(permission) => Ok(()),
        Some(user) => {
            tracing::debug!(username = %user.username, %permission, "permission denied");
            Err(AuthError::PermissionDenied(permission))
        }
        None => {
            tracing::debug!(%permission, "permission denied for anonymous caller");
            Err(AuthError::PermissionDenied(permission))
        }
    }
}
