//! Terminations are only ever created through the circuit-scoped add
//! handler, which fixes the owning circuit from the URL. The editor here
//! handles updates of an existing termination.

use async_trait::async_trait;
use minijinja::{context, Value};

use super::{parse_key, site_choices};
use crate::common::{FormData, Permission, TerminationId};
use crate::domains::circuits::forms::{
    clean_termination, termination_initial, FormError, FormValues, TERM_SIDE_CHOICES,
};
use crate::domains::circuits::models::{circuit_url, Choice, TerminationInput, TerminationRow};
use crate::domains::circuits::CIRCUIT_LIST_URL;
use crate::kernel::{EntityStore, StoreError, StoreResult};
use crate::server::views::{ObjectDeleter, ObjectEditor, ObjectRef};

/// A termination's page is its circuit's page.
fn termination_ref(row: &TerminationRow) -> ObjectRef {
    ObjectRef {
        name: row.to_string(),
        url: circuit_url(row.termination.circuit_id),
    }
}

async fn get_termination(store: &dyn EntityStore, key: &str) -> StoreResult<Option<TerminationRow>> {
    match parse_key::<crate::common::entity_ids::Termination>(key) {
        Some(id) => store.get_termination(id).await,
        None => Ok(None),
    }
}

pub async fn saved_termination(
    store: &dyn EntityStore,
    id: TerminationId,
) -> StoreResult<TerminationRow> {
    store
        .get_termination(id)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "termination",
        })
}

pub async fn termination_choices(store: &dyn EntityStore) -> StoreResult<Value> {
    let sides: Vec<Choice> = TERM_SIDE_CHOICES
        .iter()
        .map(|(side, label)| Choice::new(side, *label))
        .collect();
    Ok(context! {
        term_side => sides,
        site => site_choices(store).await?,
    })
}

pub struct TerminationEditor;

#[async_trait]
impl ObjectEditor for TerminationEditor {
    type Instance = TerminationRow;
    type Input = TerminationInput;

    const OBJ_TYPE: &'static str = "termination";
    const PERMISSION: Permission = Permission::ChangeCircuit;
    const TEMPLATE: &'static str = "circuits/termination_edit.html";
    const FIELDS_INITIAL: &'static [&'static str] = &["term_side", "site"];

    async fn get_object(
        store: &dyn EntityStore,
        key: &str,
    ) -> StoreResult<Option<TerminationRow>> {
        get_termination(store, key).await
    }

    fn initial(instance: &TerminationRow) -> FormValues {
        termination_initial(instance)
    }

    async fn clean(
        store: &dyn EntityStore,
        data: &FormData,
        instance: Option<&TerminationRow>,
    ) -> Result<TerminationInput, FormError> {
        let existing = instance.ok_or(StoreError::NotFound { entity: "circuit" })?;
        clean_termination(
            store,
            data,
            existing.termination.circuit_id,
            Some(existing.termination.id),
        )
        .await
    }

    async fn save(
        store: &dyn EntityStore,
        instance: Option<&TerminationRow>,
        input: &TerminationInput,
    ) -> StoreResult<ObjectRef> {
        let existing = instance.ok_or(StoreError::NotFound { entity: "circuit" })?;
        let updated = store
            .update_termination(existing.termination.id, input)
            .await?;
        Ok(termination_ref(&saved_termination(store, updated.id).await?))
    }

    async fn choices(store: &dyn EntityStore) -> StoreResult<Value> {
        termination_choices(store).await
    }

    fn add_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }

    fn cancel_url(instance: Option<&TerminationRow>) -> String {
        instance
            .map(|row| circuit_url(row.termination.circuit_id))
            .unwrap_or_else(|| CIRCUIT_LIST_URL.to_string())
    }
}

pub struct TerminationDeleter;

#[async_trait]
impl ObjectDeleter for TerminationDeleter {
    type Instance = TerminationRow;

    const OBJ_TYPE: &'static str = "termination";
    const PERMISSION: Permission = Permission::DeleteCircuit;
    const TEMPLATE: &'static str = "circuits/termination_delete.html";

    async fn get_object(
        store: &dyn EntityStore,
        key: &str,
    ) -> StoreResult<Option<TerminationRow>> {
        get_termination(store, key).await
    }

    fn describe(instance: &TerminationRow) -> ObjectRef {
        termination_ref(instance)
    }

    async fn delete(store: &dyn EntityStore, instance: &TerminationRow) -> StoreResult<u64> {
        store.delete_termination(instance.termination.id).await
    }

    fn list_url() -> String {
        CIRCUIT_LIST_URL.to_string()
    }

    fn success_message(instance: &TerminationRow) -> String {
        format!(
            "Termination {} has been deleted from {}",
            instance,
            instance.circuit_display()
        )
    }

    fn success_url(instance: &TerminationRow) -> String {
        circuit_url(instance.termination.circuit_id)
    }
}
