use async_trait::async_trait;

use crate::common::{entity_ids, FormData, Id, Permission};
use crate::domains::circuits::forms::{clean_provider, clean_provider_bulk, provider_initial, FormError, FormValues};
use crate::domains::circuits::import::{clean_provider_import, PROVIDER_COLUMNS};
use crate::domains::circuits::models::{Provider, ProviderBulkUpdate, ProviderInput};
use crate::domains::circuits::PROVIDER_LIST_URL;
use crate::kernel::{EntityStore, StoreResult};
use crate::server::views::{BulkDeleter, BulkEditor, BulkImporter, ObjectDeleter, ObjectEditor, ObjectRef};

fn provider_ref(provider: &Provider) -> ObjectRef {
    ObjectRef {
        name: provider.name.clone(),
        url: provider.absolute_url(),
    }
}

pub struct ProviderEditor;

#[async_trait]
impl ObjectEditor for ProviderEditor {
    type Instance = Provider;
    type Input = ProviderInput;

    const OBJ_TYPE: &'static str = "provider";
    const PERMISSION: Permission = Permission::ChangeProvider;
    const TEMPLATE: &'static str = "circuits/provider_edit.html";

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<Provider>> {
        store.get_provider_by_slug(key).await
    }

    fn initial(instance: &Provider) -> FormValues {
        provider_initial(instance)
    }

    async fn clean(
        store: &dyn EntityStore,
        data: &FormData,
        instance: Option<&Provider>,
    ) -> Result<ProviderInput, FormError> {
        clean_provider(store, data, instance.map(|p| p.id)).await
    }

    async fn save(
        store: &dyn EntityStore,
        instance: Option<&Provider>,
        input: &ProviderInput,
    ) -> StoreResult<ObjectRef> {
        let provider = match instance {
            Some(existing) => store.update_provider(existing.id, input).await?,
            None => store.insert_provider(input).await?,
        };
        Ok(provider_ref(&provider))
    }

    fn add_url() -> String {
        format!("{}add/", PROVIDER_LIST_URL)
    }

    fn cancel_url(_instance: Option<&Provider>) -> String {
        PROVIDER_LIST_URL.to_string()
    }
}

pub struct ProviderDeleter;

#[async_trait]
impl ObjectDeleter for ProviderDeleter {
    type Instance = Provider;

    const OBJ_TYPE: &'static str = "provider";
    const PERMISSION: Permission = Permission::DeleteProvider;

    async fn get_object(store: &dyn EntityStore, key: &str) -> StoreResult<Option<Provider>> {
        store.get_provider_by_slug(key).await
    }

    fn describe(instance: &Provider) -> ObjectRef {
        provider_ref(instance)
    }

    async fn delete(store: &dyn EntityStore, instance: &Provider) -> StoreResult<u64> {
        store.delete_providers(&[instance.id]).await
    }

    fn list_url() -> String {
        PROVIDER_LIST_URL.to_string()
    }
}

pub struct ProviderImporter;

#[async_trait]
impl BulkImporter for ProviderImporter {
    type Input = ProviderInput;

    const OBJ_TYPE_PLURAL: &'static str = "providers";
    const PERMISSION: Permission = Permission::AddProvider;
    const TEMPLATE: &'static str = "circuits/provider_import.html";
    const COLUMNS: &'static [&'static str] = PROVIDER_COLUMNS;

    async fn clean(store: &dyn EntityStore, text: &str) -> Result<Vec<ProviderInput>, FormError> {
        clean_provider_import(store, text).await
    }

    async fn save(store: &dyn EntityStore, inputs: &[ProviderInput]) -> StoreResult<usize> {
        Ok(store.insert_providers(inputs).await?.len())
    }

    fn list_url() -> String {
        PROVIDER_LIST_URL.to_string()
    }
}

/// Bulk edit and bulk delete of selected providers
pub struct ProviderBulk;

#[async_trait]
impl BulkEditor for ProviderBulk {
    type Pk = entity_ids::Provider;
    type Row = Provider;
    type Update = ProviderBulkUpdate;

    const OBJ_TYPE_PLURAL: &'static str = "providers";
    const PERMISSION: Permission = Permission::ChangeProvider;
    const TEMPLATE: &'static str = "circuits/provider_bulk_edit.html";

    async fn get_rows(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::Provider>],
    ) -> StoreResult<Vec<Provider>> {
        store.get_providers(pks).await
    }

    fn describe(row: &Provider) -> ObjectRef {
        provider_ref(row)
    }

    async fn clean(
        _store: &dyn EntityStore,
        data: &FormData,
    ) -> Result<ProviderBulkUpdate, FormError> {
        Ok(clean_provider_bulk(data)?)
    }

    async fn apply(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::Provider>],
        update: &ProviderBulkUpdate,
    ) -> StoreResult<u64> {
        store.bulk_update_providers(pks, update).await
    }

    fn list_url() -> String {
        PROVIDER_LIST_URL.to_string()
    }
}

#[async_trait]
impl BulkDeleter for ProviderBulk {
    type Pk = entity_ids::Provider;
    type Row = Provider;

    const OBJ_TYPE_PLURAL: &'static str = "providers";
    const PERMISSION: Permission = Permission::DeleteProvider;

    async fn get_rows(
        store: &dyn EntityStore,
        pks: &[Id<entity_ids::Provider>],
    ) -> StoreResult<Vec<Provider>> {
        store.get_providers(pks).await
    }

    fn describe(row: &Provider) -> ObjectRef {
        provider_ref(row)
    }

    async fn delete(store: &dyn EntityStore, pks: &[Id<entity_ids::Provider>]) -> StoreResult<u64> {
        store.delete_providers(pks).await
    }

    fn list_url() -> String {
        PROVIDER_LIST_URL.to_string()
    }
}
