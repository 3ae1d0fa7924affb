//! Entity store traits.
//!
//! The views depend only on these traits, never on a concrete backend. The
//! storage layer is split per entity:
//! - `ProviderStore`, `CircuitTypeStore`, `CircuitStore`, `TerminationStore`
//! - `ReferenceStore`: sites, tenants and graphs owned by other apps
//! - `EntityStore`: composite trait combining all of them
//!
//! Multi-row writes (`insert_*s`, `bulk_update_*`, `delete_*s`) are
//! all-or-nothing.

use async_trait::async_trait;
use thiserror::Error;

use crate::common::{
    CircuitId, CircuitTypeId, Page, PageRequest, ProviderId, SiteId, TenantId, TerminationId,
};
use crate::domains::circuits::filters::{CircuitFilter, ProviderFilter};
use crate::domains::circuits::models::{
    Circuit, CircuitBulkUpdate, CircuitInput, CircuitRow, CircuitType, CircuitTypeInput,
    CircuitTypeListRow, Graph, GraphType, Provider, ProviderBulkUpdate, ProviderInput,
    ProviderListRow, Site, TermSide, Tenant, Termination, TerminationInput, TerminationRow,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row vanished between lookup and write
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Delete refused because circuits still reference the row
    #[error("{entity} {name} is in use by {count} circuit(s)")]
    Protected {
        entity: &'static str,
        name: String,
        count: i64,
    },

    /// Unique constraint violated
    #[error("{entity} with this {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Filtered page of providers annotated with `count_circuits`, ordered by name.
    async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> StoreResult<Page<ProviderListRow>>;

    /// Every provider, ordered by name (select choices).
    async fn all_providers(&self) -> StoreResult<Vec<Provider>>;

    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>>;

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<Provider>>;

    async fn find_provider_by_name(&self, name: &str) -> StoreResult<Option<Provider>>;

    /// Providers with the given ids; unknown ids are skipped.
    async fn get_providers(&self, ids: &[ProviderId]) -> StoreResult<Vec<Provider>>;

    async fn insert_provider(&self, input: &ProviderInput) -> StoreResult<Provider>;

    async fn insert_providers(&self, inputs: &[ProviderInput]) -> StoreResult<Vec<Provider>>;

    async fn update_provider(&self, id: ProviderId, input: &ProviderInput)
        -> StoreResult<Provider>;

    async fn bulk_update_providers(
        &self,
        ids: &[ProviderId],
        update: &ProviderBulkUpdate,
    ) -> StoreResult<u64>;

    /// Fails with `Protected` if any of the providers still has circuits.
    async fn delete_providers(&self, ids: &[ProviderId]) -> StoreResult<u64>;

    async fn count_providers(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait CircuitTypeStore: Send + Sync {
    /// Page of circuit types annotated with `circuit_count`, ordered by name.
    async fn list_circuit_types(&self, page: PageRequest) -> StoreResult<Page<CircuitTypeListRow>>;

    async fn all_circuit_types(&self) -> StoreResult<Vec<CircuitType>>;

    async fn get_circuit_type(&self, id: CircuitTypeId) -> StoreResult<Option<CircuitType>>;

    async fn get_circuit_type_by_slug(&self, slug: &str) -> StoreResult<Option<CircuitType>>;

    async fn find_circuit_type_by_name(&self, name: &str) -> StoreResult<Option<CircuitType>>;

    async fn get_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<Vec<CircuitType>>;

    async fn insert_circuit_type(&self, input: &CircuitTypeInput) -> StoreResult<CircuitType>;

    async fn update_circuit_type(
        &self,
        id: CircuitTypeId,
        input: &CircuitTypeInput,
    ) -> StoreResult<CircuitType>;

    /// Fails with `Protected` if any of the types is still in use.
    async fn delete_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<u64>;

    async fn count_circuit_types(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait CircuitStore: Send + Sync {
    /// Filtered page of circuits with related names and `count_terminations`,
    /// ordered by provider name then cid.
    async fn list_circuits(
        &self,
        filter: &CircuitFilter,
        page: PageRequest,
    ) -> StoreResult<Page<CircuitRow>>;

    async fn circuits_for_provider(&self, provider_id: ProviderId) -> StoreResult<Vec<CircuitRow>>;

    async fn get_circuit(&self, id: CircuitId) -> StoreResult<Option<CircuitRow>>;

    async fn get_circuits(&self, ids: &[CircuitId]) -> StoreResult<Vec<CircuitRow>>;

    /// Lookup by the (provider, cid) natural key.
    async fn find_circuit(&self, provider_id: ProviderId, cid: &str)
        -> StoreResult<Option<Circuit>>;

    async fn insert_circuit(&self, input: &CircuitInput) -> StoreResult<Circuit>;

    async fn insert_circuits(&self, inputs: &[CircuitInput]) -> StoreResult<Vec<Circuit>>;

    async fn update_circuit(&self, id: CircuitId, input: &CircuitInput) -> StoreResult<Circuit>;

    async fn bulk_update_circuits(
        &self,
        ids: &[CircuitId],
        update: &CircuitBulkUpdate,
    ) -> StoreResult<u64>;

    /// Deletes the circuits and, with them, their terminations.
    async fn delete_circuits(&self, ids: &[CircuitId]) -> StoreResult<u64>;

    async fn count_circuits(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait TerminationStore: Send + Sync {
    /// Terminations of one circuit, A side first.
    async fn terminations_for_circuit(
        &self,
        circuit_id: CircuitId,
    ) -> StoreResult<Vec<TerminationRow>>;

    async fn get_termination(&self, id: TerminationId) -> StoreResult<Option<TerminationRow>>;

    async fn find_termination(
        &self,
        circuit_id: CircuitId,
        side: TermSide,
    ) -> StoreResult<Option<Termination>>;

    async fn insert_termination(
        &self,
        circuit_id: CircuitId,
        input: &TerminationInput,
    ) -> StoreResult<Termination>;

    async fn update_termination(
        &self,
        id: TerminationId,
        input: &TerminationInput,
    ) -> StoreResult<Termination>;

    async fn delete_termination(&self, id: TerminationId) -> StoreResult<u64>;

    async fn count_terminations(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;

    async fn all_sites(&self) -> StoreResult<Vec<Site>>;

    async fn get_site(&self, id: SiteId) -> StoreResult<Option<Site>>;

    async fn insert_site(&self, name: &str, slug: &str) -> StoreResult<Site>;

    async fn all_tenants(&self) -> StoreResult<Vec<Tenant>>;

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>>;

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>>;

    async fn insert_tenant(&self, name: &str, slug: &str) -> StoreResult<Tenant>;

    async fn graphs_exist(&self, graph_type: GraphType) -> StoreResult<bool>;

    async fn insert_graph(&self, graph_type: GraphType, name: &str, source: &str)
        -> StoreResult<Graph>;
}

/// Composite storage trait combining every entity store.
///
/// This is the trait object the views hold.
pub trait EntityStore:
    ProviderStore + CircuitTypeStore + CircuitStore + TerminationStore + ReferenceStore
{
}

// Blanket implementation: anything implementing all the entity traits is an EntityStore
impl<T> EntityStore for T where
    T: ProviderStore + CircuitTypeStore + CircuitStore + TerminationStore + ReferenceStore
{
}
