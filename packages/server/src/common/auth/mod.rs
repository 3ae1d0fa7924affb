/// Authorization for the circuits views
///
/// Every write handler starts with a permission check, before any store
/// access:
///
/// ```rust,ignore
/// use crate::common::auth::{require, Permission};
///
/// require(user.as_ref(), Permission::ChangeCircuit)?;
/// ```

mod builder;
mod capability;
mod errors;
mod user;

pub use builder::{require, Actor, CapabilityBuilder};
pub use capability::Permission;
pub use errors::AuthError;
pub use user::AuthUser;
