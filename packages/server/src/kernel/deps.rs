//! Server dependencies shared by every handler.
//!
//! The store is held as a trait object so the same router runs against
//! Postgres in production and the in-memory store in tests.

use std::sync::Arc;

use crate::common::{FormData, PageRequest};
use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::kernel::store::EntityStore;
use crate::kernel::templates::Renderer;

#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn EntityStore>,
    pub renderer: Arc<Renderer>,
    /// JWT service for token verification
    pub jwt_service: Arc<JwtService>,
    pub paginate_count: u32,
    pub max_page_size: u32,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn EntityStore>, config: &Config) -> Self {
        Self {
            store,
            renderer: Arc::new(Renderer::new()),
            jwt_service: Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_issuer.clone(),
            )),
            paginate_count: config.paginate_count,
            max_page_size: config.max_page_size,
        }
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Page request from list query parameters, bounded by the configured sizes.
    pub fn page_request(&self, params: &FormData) -> PageRequest {
        PageRequest::from_params(params, self.paginate_count, self.max_page_size)
    }
}
