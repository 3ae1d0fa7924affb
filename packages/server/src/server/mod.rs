// HTTP server setup (Axum + minijinja pages)
pub mod app;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod routes;
pub mod static_files;
pub mod views;

pub use app::*;
pub use error::{ViewError, ViewResult};
