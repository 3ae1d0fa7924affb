//! Test fixtures for creating test data.
//!
//! These go straight through the store traits, bypassing the views.

use circuits_core::domains::circuits::models::{
    CircuitInput, CircuitRow, CircuitType, CircuitTypeInput, Provider, ProviderInput, Site,
    TermSide, TerminationInput, TerminationRow,
};
use circuits_core::kernel::store::{
    CircuitStore, CircuitTypeStore, ProviderStore, ReferenceStore, TerminationStore,
};
use circuits_core::kernel::EntityStore;

pub async fn create_provider(store: &dyn EntityStore, name: &str, slug: &str) -> Provider {
    store
        .insert_provider(&ProviderInput {
            name: name.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        })
        .await
        .expect("Failed to create provider")
}

pub async fn create_circuit_type(store: &dyn EntityStore, name: &str, slug: &str) -> CircuitType {
    store
        .insert_circuit_type(&CircuitTypeInput {
            name: name.to_string(),
            slug: slug.to_string(),
        })
        .await
        .expect("Failed to create circuit type")
}

pub async fn create_site(store: &dyn EntityStore, name: &str, slug: &str) -> Site {
    store
        .insert_site(name, slug)
        .await
        .expect("Failed to create site")
}

/// Create a circuit and return it joined with its provider and type names.
pub async fn create_circuit(
    store: &dyn EntityStore,
    provider: &Provider,
    circuit_type: &CircuitType,
    cid: &str,
) -> CircuitRow {
    let circuit = store
        .insert_circuit(&CircuitInput {
            cid: cid.to_string(),
            provider_id: provider.id,
            type_id: circuit_type.id,
            tenant_id: None,
            site_id: None,
            install_date: None,
            commit_rate: None,
            description: String::new(),
            comments: String::new(),
        })
        .await
        .expect("Failed to create circuit");
    store
        .get_circuit(circuit.id)
        .await
        .expect("Failed to load circuit")
        .expect("Circuit vanished")
}

pub async fn create_termination(
    store: &dyn EntityStore,
    circuit: &CircuitRow,
    side: TermSide,
    site: &Site,
) -> TerminationRow {
    let termination = store
        .insert_termination(
            circuit.circuit.id,
            &TerminationInput {
                term_side: side,
                site_id: site.id,
                port_speed: 10_000,
                upstream_speed: None,
                xconnect_id: String::new(),
                pp_info: String::new(),
            },
        )
        .await
        .expect("Failed to create termination");
    store
        .get_termination(termination.id)
        .await
        .expect("Failed to load termination")
        .expect("Termination vanished")
}

/// A provider, a circuit type and a site; the minimum for a circuit with
/// terminations.
pub struct Basics {
    pub provider: Provider,
    pub circuit_type: CircuitType,
    pub site: Site,
}

pub async fn create_basics(store: &dyn EntityStore) -> Basics {
    Basics {
        provider: create_provider(store, "Level3", "level3").await,
        circuit_type: create_circuit_type(store, "Internet Transit", "internet-transit").await,
        site: create_site(store, "DC East", "dc-east").await,
    }
}
