// HTTP routes
pub mod circuit_types;
pub mod circuits;
pub mod health;
pub mod providers;
pub mod terminations;

pub use health::*;

use axum::{routing::get, Router};

use crate::domains::circuits::views::{
    CircuitBulk, CircuitDeleter, CircuitEditor, CircuitImporter, CircuitTypeBulk,
    CircuitTypeDeleter, CircuitTypeEditor, ProviderBulk, ProviderDeleter, ProviderEditor,
    ProviderImporter, TerminationDeleter, TerminationEditor,
};
use crate::server::views::{
    bulk_delete, bulk_edit, bulk_import, object_add, object_delete, object_edit,
};

/// Every circuits page, to be nested under `/circuits`.
pub fn circuit_routes() -> Router {
    Router::new()
        // Providers
        .route("/providers/", get(providers::provider_list))
        .route(
            "/providers/add/",
            get(object_add::<ProviderEditor>).post(object_add::<ProviderEditor>),
        )
        .route(
            "/providers/import/",
            get(bulk_import::<ProviderImporter>).post(bulk_import::<ProviderImporter>),
        )
        .route(
            "/providers/edit/",
            get(bulk_edit::<ProviderBulk>).post(bulk_edit::<ProviderBulk>),
        )
        .route(
            "/providers/delete/",
            get(bulk_delete::<ProviderBulk>).post(bulk_delete::<ProviderBulk>),
        )
        .route("/providers/:slug/", get(providers::provider_detail))
        .route(
            "/providers/:slug/edit/",
            get(object_edit::<ProviderEditor>).post(object_edit::<ProviderEditor>),
        )
        .route(
            "/providers/:slug/delete/",
            get(object_delete::<ProviderDeleter>).post(object_delete::<ProviderDeleter>),
        )
        // Circuit types
        .route("/circuit-types/", get(circuit_types::circuit_type_list))
        .route(
            "/circuit-types/add/",
            get(object_add::<CircuitTypeEditor>).post(object_add::<CircuitTypeEditor>),
        )
        .route(
            "/circuit-types/delete/",
            get(bulk_delete::<CircuitTypeBulk>).post(bulk_delete::<CircuitTypeBulk>),
        )
        .route(
            "/circuit-types/:slug/edit/",
            get(object_edit::<CircuitTypeEditor>).post(object_edit::<CircuitTypeEditor>),
        )
        .route(
            "/circuit-types/:slug/delete/",
            get(object_delete::<CircuitTypeDeleter>).post(object_delete::<CircuitTypeDeleter>),
        )
        // Circuits
        .route("/circuits/", get(circuits::circuit_list))
        .route(
            "/circuits/add/",
            get(object_add::<CircuitEditor>).post(object_add::<CircuitEditor>),
        )
        .route(
            "/circuits/import/",
            get(bulk_import::<CircuitImporter>).post(bulk_import::<CircuitImporter>),
        )
        .route(
            "/circuits/edit/",
            get(bulk_edit::<CircuitBulk>).post(bulk_edit::<CircuitBulk>),
        )
        .route(
            "/circuits/delete/",
            get(bulk_delete::<CircuitBulk>).post(bulk_delete::<CircuitBulk>),
        )
        .route("/circuits/:pk/", get(circuits::circuit_detail))
        .route(
            "/circuits/:pk/edit/",
            get(object_edit::<CircuitEditor>).post(object_edit::<CircuitEditor>),
        )
        .route(
            "/circuits/:pk/delete/",
            get(object_delete::<CircuitDeleter>).post(object_delete::<CircuitDeleter>),
        )
        .route(
            "/circuits/:pk/terminations/add/",
            get(terminations::termination_add).post(terminations::termination_add),
        )
        // Terminations
        .route(
            "/terminations/:pk/edit/",
            get(object_edit::<TerminationEditor>).post(object_edit::<TerminationEditor>),
        )
        .route(
            "/terminations/:pk/delete/",
            get(object_delete::<TerminationDeleter>).post(object_delete::<TerminationDeleter>),
        )
}
