use async_trait::async_trait;
use minijinja::Value;

use super::{circuit_choices, parse_key};
use crate::common::{entity_ids, CircuitId, FormData, Id, Permission};
use crate::domains::circuits::forms::{
    circuit_initial, clean_circuit, clean_circuit_bulk, FormError, FormValues,
};
use crate::domains::circuits::import::{clean_circuit_import, CIRCUIT_COLUMNS};
use crate::domains::circuits::models::{CircuitBulkUpdate, CircuitInput, CircuitRow};
use crate::domains::circuits::CIRCUIT_LIST_URL;
use crate::kernel::{EntityStore, StoreError, StoreResult};
use crate::server::views::{BulkDeleter, BulkEditor, BulkImporter, ObjectDeleter, ObjectEditor, ObjectRef};

fn circuit_ref(row: &CircuitRow) -> ObjectRef {
    ObjectRef {
        name: row.to_string(),
        url: row.absolute_url(),
    }
}

/// Re-read a saved circuit with its joined names, for notices.
async fn saved_row(store: &dyn EntityStore, id: CircuitId) -> StoreResult<CircuitRow> {
    store
        .get_circuit(id)
        .await?
        .ok_or(StoreError::NotFound { entity: "circuit" })
}

pub struct CircuitEditor;

#[async_trait]
impl ObjectEditor for CircuitEditor {
    type Instance = CircuitRow;
    type Input = CircuitInput;

    const OBJ_TYPE: &'static str = "circuit";
    const PERMISSION: Permission = Permission::ChangeCircuit;
    const TEMPLATE: &'static str = "circuits/circuit_edit.html";
    const FIELDS_INITIAL: &'static [&'static str] = &["site"];

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<CircuitRow>> {
        match parse_key(key) {
            Some(id) => store.get_circuit(id).await,
            None => Ok(None),
        }
    }

    fn initial(instance: &CircuitRow) -> FormValues {
        circuit_initial(instance)
    }

    async fn clean(
        store: &dyn EntityStore,
        data: &FormData,
        instance: Option<&CircuitRow>,
    ) -> Result<CircuitInput, FormError> {
        clean_circuit(store, data, instance.map(|row| row.circuit.id)).await
    }

    async fn save(
        store: &dyn EntityStore,
        instance: Option<&CircuitRow>,
        input: &CircuitInput,
    ) -> StoreResult<ObjectRef> {
        let circuit = match instance {
            Some(existing) => store.update_circuit(existing.circuit.id, input).await?,
            None => store.insert_circuit(input).await?,
        };
        Ok(circuit_ref(&saved_row(store, circuit.id).await?))
    }

    async fn choices(store: &dyn EntityStore) -> StoreResult<Value> {
        circuit_choices(store).await
    }

    fn add_url() -> String {
        format!("{}add/", CIRCUIT_LIST_URL)
    }

    fn cancel_url(_instance: Option<&CircuitRow>) -> String {
        CIRCUIT_LIST_URL.to_string()
    }
}

pub struct CircuitDeleter;

#[async_trait]
impl ObjectDeleter for CircuitDeleter {
    type Instance = CircuitRow;

    const OBJ_TYPE: &'static str = "circuit";
    const PERMISSION: Permission = Permission::DeleteCircuit;

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<CircuitRow>> {
        match parse_key(key) {
            Some(id) => store.get_circuit(id).await,
            None => Ok(None),
        }
    }

    fn describe(instance: &CircuitRow) -> ObjectRef {
        circuit_ref(instance)
    }

    async fn delete(store: &dyn EntityStore, instance: &CircuitRow) -> StoreResult<u64> {
        store.delete_circuits(&[instance.circuit.id]).await
    }

    fn list_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }
}

pub struct CircuitImporter;

#[async_trait]
impl BulkImporter for CircuitImporter {
    type Input = CircuitInput;

    const OBJ_TYPE_PLURAL: &'static str = "circuits";
    const PERMISSION: Permission = Permission::AddCircuit;
    const TEMPLATE: &'static str = "circuits/circuit_import.html";
    const COLUMNS: &'static [&'static str] = CIRCUIT_COLUMNS;

    async fn clean(store: &dyn EntityStore, text: &str) -> Result<Vec<CircuitInput>, FormError> {
        clean_circuit_import(store, text).await
    }

    async fn save(store: &dyn EntityStore, inputs: &[CircuitInput]) -> StoreResult<usize> {
        Ok(store.insert_circuits(inputs).await?.len())
    }

    fn list_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }
}

/// Bulk edit and bulk delete of selected circuits
pub struct CircuitBulk;

#[async_trait]
impl BulkEditor for CircuitBulk {
    type Pk = entity_ids::Circuit;
    type Row = CircuitRow;
    type Update = CircuitBulkUpdate;

    const OBJ_TYPE_PLURAL: &'static str = "circuits";
    const PERMISSION: Permission = Permission::ChangeCircuit;
    const TEMPLATE: &'static str = "circuits/circuit_bulk_edit.html";

    async fn get_rows(store: &dyn EntityStore, pks: &[CircuitId]) -> StoreResult<Vec<CircuitRow>> {
        store.get_circuits(pks).await
    }

    fn describe(row: &CircuitRow) -> ObjectRef {
        circuit_ref(row)
    }

    async fn clean(store: &dyn EntityStore, data: &FormData) -> Result<CircuitBulkUpdate, FormError> {
        clean_circuit_bulk(store, data).await
    }

    async fn apply(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::Circuit>],
        update: &CircuitBulkUpdate,
    ) -> StoreResult<u64> {
        store.bulk_update_circuits(pks, update).await
    }

    async fn choices(store: &dyn EntityStore) -> StoreResult<Value> {
        circuit_choices(store).await
    }

    fn list_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }
}

#[async_trait]
impl BulkDeleter for CircuitBulk {
    type Pk = entity_ids::Circuit;
    type Row = CircuitRow;

    const OBJ_TYPE_PLURAL: &'static str = "circuits";
    const PERMISSION: Permission = Permission::DeleteCircuit;

    async fn get_rows(store: &dyn EntityStore, pks: &[CircuitId]) -> StoreResult<Vec<CircuitRow>> {
        store.get_circuits(pks).await
    }

    fn describe(row: &CircuitRow) -> ObjectRef {
        circuit_ref(row)
    }

    async fn delete(store: &dyn EntityStore, pks: &[CircuitId]) -> StoreResult<u64> {
        store.delete_circuits(pks).await
    }

    fn list_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }
}
