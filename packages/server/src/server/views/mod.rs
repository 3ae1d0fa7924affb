//! Generic object views.
//!
//! Each view is an axum handler generic over a descriptor trait that says
//! which store calls, form cleaner, template and permission an entity uses:
//!
//! - [`ObjectEditor`]: create/update form ([`object_add`], [`object_edit`])
//! - [`ObjectDeleter`]: confirm and delete one object ([`object_delete`])
//! - [`BulkImporter`], [`BulkEditor`], [`BulkDeleter`]: many rows per request
//!
//! Every handler checks its permission before touching the store.

pub mod bulk;
pub mod delete;
pub mod edit;

pub use bulk::{bulk_delete, bulk_edit, bulk_import, BulkDeleter, BulkEditor, BulkImporter};
pub use delete::{object_delete, ObjectDeleter};
pub use edit::{object_add, object_edit, ObjectEditor};

use axum::response::Response;
use indexmap::IndexMap;
use minijinja::{context, Value};
use serde::Serialize;

use crate::common::{FormData, Id};
use crate::domains::circuits::forms::{FormErrors, FormValues};
use crate::kernel::StoreError;
use crate::server::app::AppState;
use crate::server::error::ViewResult;
use crate::server::flash::Flash;

/// Display name and page of an object, for notices and redirects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRef {
    pub name: String,
    pub url: String,
}

/// Render `template` with `ctx` plus the flash messages waiting for this page.
pub fn render(state: &AppState, flash: &Flash, template: &str, ctx: Value) -> ViewResult<Response> {
    let ctx = context! {
        messages => flash.messages(),
        ..ctx
    };
    let html = state.deps.renderer.render(template, ctx)?;
    Ok(flash.page(html))
}

/// Initial values for a create form, taken from the query string.
pub fn initial_from_query(params: &FormData, fields: &[&str]) -> FormValues {
    fields
        .iter()
        .filter_map(|field| params.get(field).map(|v| (field.to_string(), v.to_string())))
        .collect::<IndexMap<_, _>>()
}

/// Keys ticked in a list's checkboxes; unparseable keys are skipped.
pub fn selected_pks<T>(data: &FormData) -> Vec<Id<T>> {
    let mut pks: Vec<Id<T>> = data
        .get_all("pk")
        .into_iter()
        .filter_map(|pk| Id::parse(pk).ok())
        .collect();
    pks.sort();
    pks.dedup();
    pks
}

/// Turn a unique-constraint rejection from the store into a form error.
///
/// Other store errors are returned unchanged.
pub fn conflict_as_form_error(err: StoreError) -> Result<FormErrors, StoreError> {
    match err {
        StoreError::Conflict { field, .. } => {
            let mut errors = FormErrors::new();
            let field_name = if field == "side" { "term_side" } else { field };
            errors.add(field_name, err.to_string());
            Ok(errors)
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CircuitId;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_selected_pks_skips_garbage_and_duplicates() {
        let id = CircuitId::new();
        let form = data(&[
            ("pk", &id.to_string()),
            ("pk", "not-a-uuid"),
            ("pk", &id.to_string()),
        ]);
        assert_eq!(selected_pks::<crate::common::Circuit>(&form), vec![id]);
    }

    #[test]
    fn test_initial_from_query_only_listed_fields() {
        let params = data(&[("site", "abc"), ("cid", "X")]);
        let values = initial_from_query(&params, &["site"]);
        assert_eq!(values.get("site").map(String::as_str), Some("abc"));
        assert!(!values.contains_key("cid"));
    }

    #[test]
    fn test_conflict_maps_to_field() {
        let errors = conflict_as_form_error(StoreError::Conflict {
            entity: "termination",
            field: "side",
        })
        .unwrap();
        assert!(errors.has("term_side"));
        assert!(conflict_as_form_error(StoreError::NotFound { entity: "circuit" }).is_err());
    }
}
