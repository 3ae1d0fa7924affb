// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod form_data;
pub mod id;
pub mod pagination;

pub use auth::{require, Actor, AuthError, AuthUser, Permission};
pub use entity_ids::*;
pub use form_data::FormData;
pub use id::Id;
pub use pagination::{Page, PageRequest};
