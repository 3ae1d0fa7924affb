//! Import, edit and delete many rows in one request.
//!
//! Each bulk write goes to the store as a single multi-row call, so a batch
//! either lands completely or not at all.

use async_trait::async_trait;
use axum::{extract::Form, http::Method, response::Response, Extension};
use minijinja::{context, Value};
use tracing::{info, warn};

use super::{render, selected_pks, ObjectRef};
use crate::common::{require, FormData, Id, Permission};
use crate::domains::circuits::forms::{FormError, FormErrors, NON_FIELD_ERRORS, REQUIRED};
use crate::domains::circuits::import::{batch_rejected, missing_csv, CSV_FIELD};
use crate::kernel::{EntityStore, StoreError, StoreResult};
use crate::server::app::AppState;
use crate::server::error::ViewResult;
use crate::server::flash::{Flash, Message};
use crate::server::middleware::CurrentUser;

pub const BULK_DELETE_TEMPLATE: &str = "utilities/obj_bulk_delete.html";

// ============================================================================
// Import
// ============================================================================

#[async_trait]
pub trait BulkImporter: Send + Sync + 'static {
    type Input: Send + Sync;

    /// Plural display name, e.g. "providers"
    const OBJ_TYPE_PLURAL: &'static str;
    const PERMISSION: Permission;
    const TEMPLATE: &'static str;
    /// Column order of the header-less CSV
    const COLUMNS: &'static [&'static str];

    async fn clean(store: &dyn EntityStore, text: &str) -> Result<Vec<Self::Input>, FormError>;

    /// Insert every row; returns how many were created.
    async fn save(store: &dyn EntityStore, inputs: &[Self::Input]) -> StoreResult<usize>;

    fn list_url() -> String;
}

pub async fn bulk_import<I: BulkImporter>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    method: Method,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), I::PERMISSION)?;
    let store = state.deps.store();

    let mut errors = FormErrors::new();
    if method == Method::POST {
        let cleaned = match data.get(CSV_FIELD) {
            Some(text) => I::clean(store, text).await,
            None => Err(FormError::Invalid(missing_csv())),
        };
        errors = match cleaned {
            Ok(inputs) => match I::save(store, &inputs).await {
                Ok(count) => {
                    info!(
                        obj_type = I::OBJ_TYPE_PLURAL,
                        count,
                        user = user.username(),
                        "Imported objects"
                    );
                    let message =
                        Message::success(format!("Imported {} {}", count, I::OBJ_TYPE_PLURAL));
                    return Ok(flash.redirect(&I::list_url(), message));
                }
                Err(e @ (StoreError::Conflict { .. } | StoreError::NotFound { .. })) => {
                    batch_rejected(e)
                }
                Err(e) => return Err(e.into()),
            },
            Err(FormError::Invalid(errors)) => errors,
            Err(FormError::Store(e)) => return Err(e.into()),
        };
    }

    render(
        &state,
        &flash,
        I::TEMPLATE,
        context! {
            obj_type_plural => I::OBJ_TYPE_PLURAL,
            columns => I::COLUMNS,
            csv => data.get(CSV_FIELD),
            errors => errors,
            cancel_url => I::list_url(),
        },
    )
}

// ============================================================================
// Edit
// ============================================================================

#[async_trait]
pub trait BulkEditor: Send + Sync + 'static {
    /// Entity marker of the selected keys
    type Pk: 'static;
    type Row: Send + Sync;
    type Update: Send + Sync;

    const OBJ_TYPE_PLURAL: &'static str;
    const PERMISSION: Permission;
    const TEMPLATE: &'static str;

    async fn get_rows(store: &dyn EntityStore, pks: &[Id<Self::Pk>])
        -> StoreResult<Vec<Self::Row>>;

    fn describe(row: &Self::Row) -> ObjectRef;

    /// Shared fields; blank ones leave the column unchanged.
    async fn clean(store: &dyn EntityStore, data: &FormData) -> Result<Self::Update, FormError>;

    async fn apply(
        store: &dyn EntityStore,
        pks: &[Id<Self::Pk>],
        update: &Self::Update,
    ) -> StoreResult<u64>;

    async fn choices(_store: &dyn EntityStore) -> StoreResult<Value> {
        Ok(Value::UNDEFINED)
    }

    fn list_url() -> String;
}

pub async fn bulk_edit<E: BulkEditor>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), E::PERMISSION)?;
    let store = state.deps.store();

    let pks = selected_pks::<E::Pk>(&data);
    let rows = if pks.is_empty() {
        Vec::new()
    } else {
        E::get_rows(store, &pks).await?
    };
    if rows.is_empty() {
        let message = Message::warning(format!("No {} were selected.", E::OBJ_TYPE_PLURAL));
        return Ok(flash.redirect(&E::list_url(), message));
    }

    let mut errors = FormErrors::new();
    let mut values = Default::default();
    if data.contains("_apply") {
        errors = match E::clean(store, &data).await {
            Ok(update) => match E::apply(store, &pks, &update).await {
                Ok(count) => {
                    info!(
                        obj_type = E::OBJ_TYPE_PLURAL,
                        count,
                        user = user.username(),
                        "Bulk updated objects"
                    );
                    let message =
                        Message::success(format!("Updated {} {}", count, E::OBJ_TYPE_PLURAL));
                    return Ok(flash.redirect(&E::list_url(), message));
                }
                Err(e @ StoreError::Conflict { .. }) => {
                    let mut errors = FormErrors::new();
                    errors.add(NON_FIELD_ERRORS, e.to_string());
                    errors
                }
                Err(e) => return Err(e.into()),
            },
            Err(FormError::Invalid(errors)) => errors,
            Err(FormError::Store(e)) => return Err(e.into()),
        };
        values = data.values();
    }

    let objects: Vec<ObjectRef> = rows.iter().map(E::describe).collect();
    let choices = E::choices(store).await?;
    render(
        &state,
        &flash,
        E::TEMPLATE,
        context! {
            obj_type_plural => E::OBJ_TYPE_PLURAL,
            objects => objects,
            pks => pks.iter().map(ToString::to_string).collect::<Vec<_>>(),
            values => values,
            errors => errors,
            choices => choices,
            cancel_url => E::list_url(),
        },
    )
}

// ============================================================================
// Delete
// ============================================================================

#[async_trait]
pub trait BulkDeleter: Send + Sync + 'static {
    type Pk: 'static;
    type Row: Send + Sync;

    const OBJ_TYPE_PLURAL: &'static str;
    const PERMISSION: Permission;
    const TEMPLATE: &'static str = BULK_DELETE_TEMPLATE;

    async fn get_rows(store: &dyn EntityStore, pks: &[Id<Self::Pk>])
        -> StoreResult<Vec<Self::Row>>;

    fn describe(row: &Self::Row) -> ObjectRef;

    async fn delete(store: &dyn EntityStore, pks: &[Id<Self::Pk>]) -> StoreResult<u64>;

    fn list_url() -> String;
}

pub async fn bulk_delete<D: BulkDeleter>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), D::PERMISSION)?;
    let store = state.deps.store();

    let pks = selected_pks::<D::Pk>(&data);
    let rows = if pks.is_empty() {
        Vec::new()
    } else {
        D::get_rows(store, &pks).await?
    };
    if rows.is_empty() {
        let message = Message::warning(format!("No {} were selected.", D::OBJ_TYPE_PLURAL));
        return Ok(flash.redirect(&D::list_url(), message));
    }

    let mut errors = FormErrors::new();
    if data.contains("_confirm") {
        if data.is_checked("confirm") {
            return match D::delete(store, &pks).await {
                Ok(count) => {
                    info!(
                        obj_type = D::OBJ_TYPE_PLURAL,
                        count,
                        user = user.username(),
                        "Bulk deleted objects"
                    );
                    let message =
                        Message::success(format!("Deleted {} {}", count, D::OBJ_TYPE_PLURAL));
                    Ok(flash.redirect(&D::list_url(), message))
                }
                Err(e @ StoreError::Protected { .. }) => {
                    warn!(obj_type = D::OBJ_TYPE_PLURAL, error = %e, "Bulk delete refused");
                    let message = Message::error(format!(
                        "Unable to delete {}: {}",
                        D::OBJ_TYPE_PLURAL,
                        e
                    ));
                    Ok(flash.redirect(&D::list_url(), message))
                }
                Err(e) => Err(e.into()),
            };
        }
        errors.add("confirm", REQUIRED);
    }

    let objects: Vec<ObjectRef> = rows.iter().map(D::describe).collect();
    render(
        &state,
        &flash,
        D::TEMPLATE,
        context! {
            obj_type_plural => D::OBJ_TYPE_PLURAL,
            objects => objects,
            pks => pks.iter().map(ToString::to_string).collect::<Vec<_>>(),
            errors => errors,
            cancel_url => D::list_url(),
        },
    )
}
