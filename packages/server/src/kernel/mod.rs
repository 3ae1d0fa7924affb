//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod store;
pub mod templates;

pub use deps::ServerDeps;
pub use store::{EntityStore, MemoryStore, PostgresStore, StoreError, StoreResult};
pub use templates::{RenderError, Renderer};
