//! Entity descriptors for the generic views in `server::views`.

mod circuit;
mod circuit_type;
mod provider;
mod termination;

pub use circuit::{CircuitBulk, CircuitDeleter, CircuitEditor, CircuitImporter};
pub use circuit_type::{CircuitTypeBulk, CircuitTypeDeleter, CircuitTypeEditor};
pub use provider::{ProviderBulk, ProviderDeleter, ProviderEditor, ProviderImporter};
pub use termination::{
    saved_termination, termination_choices, TerminationDeleter, TerminationEditor,
};

use minijinja::{context, Value};

use crate::common::Id;
use crate::domains::circuits::models::Choice;
use crate::kernel::{EntityStore, StoreResult};

/// Select options for the circuit forms, with tenant and site optional.
pub async fn circuit_choices(store: &dyn EntityStore) -> StoreResult<Value> {
    let providers: Vec<Choice> = store
        .all_providers()
        .await?
        .into_iter()
        .map(|p| Choice::new(p.id, p.name))
        .collect();
    let types: Vec<Choice> = store
        .all_circuit_types()
        .await?
        .into_iter()
        .map(|t| Choice::new(t.id, t.name))
        .collect();
    let tenants: Vec<Choice> = store
        .all_tenants()
        .await?
        .into_iter()
        .map(|t| Choice::new(t.id, t.name))
        .collect();
    let sites = site_choices(store).await?;

    Ok(context! {
        provider => providers,
        circuit_type => types,
        tenant => tenants,
        site => sites,
    })
}

pub async fn site_choices(store: &dyn EntityStore) -> StoreResult<Vec<Choice>> {
    Ok(store
        .all_sites()
        .await?
        .into_iter()
        .map(|s| Choice::new(s.id, s.name))
        .collect())
}

/// A URL key that is not a valid id can never match a row.
pub(crate) fn parse_key<T>(key: &str) -> Option<Id<T>> {
    Id::parse(key).ok()
}
