use async_trait::async_trait;

use crate::common::{entity_ids, FormData, Id, Permission};
use crate::domains::circuits::forms::{circuit_type_initial, clean_circuit_type, FormError, FormValues};
use crate::domains::circuits::models::{CircuitType, CircuitTypeInput};
use crate::domains::circuits::CIRCUIT_TYPE_LIST_URL;
use crate::kernel::{EntityStore, StoreResult};
use crate::server::views::{BulkDeleter, ObjectDeleter, ObjectEditor, ObjectRef};

fn circuit_type_ref(circuit_type: &CircuitType) -> ObjectRef {
    ObjectRef {
        name: circuit_type.name.clone(),
        url: circuit_type.absolute_url(),
    }
}

pub struct CircuitTypeEditor;

#[async_trait]
impl ObjectEditor for CircuitTypeEditor {
    type Instance = CircuitType;
    type Input = CircuitTypeInput;

    const OBJ_TYPE: &'static str = "circuit type";
    const PERMISSION: Permission = Permission::ChangeCircuitType;
    const TEMPLATE: &'static str = "circuits/circuittype_edit.html";

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<CircuitType>> {
        store.get_circuit_type_by_slug(key).await
    }

    fn initial(instance: &CircuitType) -> FormValues {
        circuit_type_initial(instance)
    }

    async fn clean(
        store: &dyn EntityStore,
        data: &FormData,
        instance: Option<&CircuitType>,
    ) -> Result<CircuitTypeInput, FormError> {
        clean_circuit_type(store, data, instance.map(|t| t.id)).await
    }

    async fn save(
        store: &dyn EntityStore,
        instance: Option<&CircuitType>,
        input: &CircuitTypeInput,
    ) -> StoreResult<ObjectRef> {
        let circuit_type = match instance {
            Some(existing) => store.update_circuit_type(existing.id, input).await?,
            None => store.insert_circuit_type(input).await?,
        };
        Ok(circuit_type_ref(&circuit_type))
    }

    fn add_url() -> String {
        format!("{}add/", CIRCUIT_TYPE_LIST_URL)
    }

    fn cancel_url(_instance: Option<&CircuitType>) -> String {
        CIRCUIT_TYPE_LIST_URL.to_string()
    }

    // Types have no detail page
    fn success_url(_saved: &ObjectRef) -> String {
        CIRCUIT_TYPE_LIST_URL.to_string()
    }
}

pub struct CircuitTypeDeleter;

#[async_trait]
impl ObjectDeleter for CircuitTypeDeleter {
    type Instance = CircuitType;

    const OBJ_TYPE: &'static str = "circuit type";
    const PERMISSION: Permission = Permission::DeleteCircuitType;

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<CircuitType>> {
        store.get_circuit_type_by_slug(key).await
    }

    fn describe(instance: &CircuitType) -> ObjectRef {
        circuit_type_ref(instance)
    }

    async fn delete(store: &dyn EntityStore, instance: &CircuitType) -> StoreResult<u64> {
        store.delete_circuit_types(&[instance.id]).await
    }

    fn list_url() -> String {
        CIRCUIT_TYPE_LIST_URL.to_string()
    }

    fn cancel_url(_instance: &CircuitType) -> String {
        CIRCUIT_TYPE_LIST_URL.to_string()
    }
}

pub struct CircuitTypeBulk;

#[async_trait]
impl BulkDeleter for CircuitTypeBulk {
    type Pk = entity_ids::CircuitType;
    type Row = CircuitType;

    const OBJ_TYPE_PLURAL: &'static str = "circuit types";
    const PERMISSION: Permission = Permission::DeleteCircuitType;

    async fn get_rows(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::CircuitType>],
    ) -> StoreResult<Vec<CircuitType>> {
        store.get_circuit_types(pks).await
    }

    fn describe(row: &CircuitType) -> ObjectRef {
        circuit_type_ref(row)
    }

    async fn delete(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::CircuitType>],
    ) -> StoreResult<u64> {
        store.delete_circuit_types(pks).await
    }

    fn list_url() -> String {
        CIRCUIT_TYPE_LIST_URL.to_string()
    }
}
