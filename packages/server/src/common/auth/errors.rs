use thiserror::Error;

use super::Permission;

/// Authorization errors for the circuits views
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Permission denied: {0} required")]
    PermissionDenied(Permission),

    #[error("Invalid or expired token")]
    InvalidToken,
}
