use indexmap::IndexMap;

use super::{FormError, FormValues, Fields, INVALID_CHOICE};
use crate::common::{CircuitId, FormData};
use crate::domains::circuits::models::{CircuitBulkUpdate, CircuitInput, CircuitRow};
use crate::kernel::store::EntityStore;

const COMMIT_RATE_MAX: i64 = i32::MAX as i64;

/// Validate a circuit form; `instance` is the circuit being edited.
///
/// Every referenced provider, type, tenant and site must exist, and the cid
/// must be unique for its provider.
pub async fn clean_circuit(
    store: &dyn EntityStore,
    data: &FormData,
    instance: Option<CircuitId>,
) -> Result<CircuitInput, FormError> {
    let mut fields = Fields::new(data);
    let cid = fields.required_str("cid", 50);
    let provider_id = fields.required_id("provider");
    let type_id = fields.required_id("type");
    let tenant_id = fields.optional_id("tenant");
    let site_id = fields.optional_id("site");
    let install_date = fields.optional_date("install_date");
    let commit_rate = fields
        .optional_int("commit_rate", 0, COMMIT_RATE_MAX)
        .map(|v| v as i32);
    let description = fields.optional_str("description", 100);
    let comments = fields.optional_str("comments", 100_000);

    if let Some(id) = provider_id {
        if store.get_provider(id).await?.is_none() {
            fields.error("provider", INVALID_CHOICE);
        }
    }
    if let Some(id) = type_id {
        if store.get_circuit_type(id).await?.is_none() {
            fields.error("type", INVALID_CHOICE);
        }
    }
    if let Some(id) = tenant_id {
        if store.get_tenant(id).await?.is_none() {
            fields.error("tenant", INVALID_CHOICE);
        }
    }
    if let Some(id) = site_id {
        if store.get_site(id).await?.is_none() {
            fields.error("site", INVALID_CHOICE);
        }
    }

    let (Some(provider_id), Some(type_id)) = (provider_id, type_id) else {
        return Err(fields.into_errors().into());
    };

    if !fields.has_error("cid") && !fields.has_error("provider") {
        if let Some(existing) = store.find_circuit(provider_id, &cid).await? {
            if Some(existing.id) != instance {
                fields.error(
                    "cid",
                    "Circuit with this Provider and Circuit ID already exists.",
                );
            }
        }
    }

    Ok(fields.finish(CircuitInput {
        cid,
        provider_id,
        type_id,
        tenant_id,
        site_id,
        install_date,
        commit_rate,
        description,
        comments,
    })?)
}

pub fn circuit_initial(row: &CircuitRow) -> FormValues {
    let circuit = &row.circuit;
    let mut values = IndexMap::new();
    values.insert("cid".to_string(), circuit.cid.clone());
    values.insert("provider".to_string(), circuit.provider_id.to_string());
    values.insert("type".to_string(), circuit.type_id.to_string());
    values.insert(
        "tenant".to_string(),
        circuit.tenant_id.map(|id| id.to_string()).unwrap_or_default(),
    );
    values.insert(
        "site".to_string(),
        circuit.site_id.map(|id| id.to_string()).unwrap_or_default(),
    );
    values.insert(
        "install_date".to_string(),
        circuit
            .install_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    );
    values.insert(
        "commit_rate".to_string(),
        circuit.commit_rate.map(|r| r.to_string()).unwrap_or_default(),
    );
    values.insert("description".to_string(), circuit.description.clone());
    values.insert("comments".to_string(), circuit.comments.clone());
    values
}

/// Shared fields of the circuit bulk edit form.
///
/// Blank leaves a column unchanged; `_nullify=tenant` clears the tenant.
pub async fn clean_circuit_bulk(
    store: &dyn EntityStore,
    data: &FormData,
) -> Result<CircuitBulkUpdate, FormError> {
    let mut fields = Fields::new(data);
    let provider_id = fields.optional_id("provider");
    let type_id = fields.optional_id("type");
    let tenant_id = fields.optional_id("tenant");
    let commit_rate = fields
        .optional_int("commit_rate", 0, COMMIT_RATE_MAX)
        .map(|v| v as i32);
    let description = fields.optional_str("description", 100);
    let comments = fields.optional_str("comments", 100_000);

    if let Some(id) = provider_id {
        if store.get_provider(id).await?.is_none() {
            fields.error("provider", INVALID_CHOICE);
        }
    }
    if let Some(id) = type_id {
        if store.get_circuit_type(id).await?.is_none() {
            fields.error("type", INVALID_CHOICE);
        }
    }
    if let Some(id) = tenant_id {
        if store.get_tenant(id).await?.is_none() {
            fields.error("tenant", INVALID_CHOICE);
        }
    }

    let nullify_tenant = data.get_all("_nullify").contains(&"tenant");
    let tenant_id = match (tenant_id, nullify_tenant) {
        (Some(id), _) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };

    Ok(fields.finish(CircuitBulkUpdate {
        provider_id,
        type_id,
        tenant_id,
        commit_rate,
        description: (!description.is_empty()).then_some(description),
        comments: (!comments.is_empty()).then_some(comments),
    })?)
}
