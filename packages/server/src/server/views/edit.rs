use async_trait::async_trait;
use axum::{
    extract::{Path, Form},
    http::Method,
    response::Response,
    Extension,
};
use minijinja::{context, Value};
use serde::Serialize;
use tracing::info;

use super::{conflict_as_form_error, initial_from_query, render, ObjectRef};
use crate::common::{require, FormData, Permission};
use crate::domains::circuits::forms::{FormError, FormErrors, FormValues};
use crate::kernel::{EntityStore, StoreResult};
use crate::server::app::AppState;
use crate::server::error::{ViewError, ViewResult};
use crate::server::flash::{Flash, Message};
use crate::server::middleware::CurrentUser;

/// Describes how one entity is created and updated through a form.
#[async_trait]
pub trait ObjectEditor: Send + Sync + 'static {
    type Instance: Serialize + Send + Sync;
    type Input: Send + Sync;

    /// Lowercase display name, e.g. "circuit type"
    const OBJ_TYPE: &'static str;
    const PERMISSION: Permission;
    const TEMPLATE: &'static str;
    /// Fields a create form may prefill from the query string
    const FIELDS_INITIAL: &'static [&'static str] = &[];

    /// Look an instance up by its URL key; `None` becomes a 404.
    async fn get_object(store: &dyn EntityStore, key: &str)
        -> StoreResult<Option<Self::Instance>>;

    fn initial(instance: &Self::Instance) -> FormValues;

    async fn clean(
        store: &dyn EntityStore,
        data: &FormData,
        instance: Option<&Self::Instance>,
    ) -> Result<Self::Input, FormError>;

    async fn save(
        store: &dyn EntityStore,
        instance: Option<&Self::Instance>,
        input: &Self::Input,
    ) -> StoreResult<ObjectRef>;

    /// Options for the form's select fields
    async fn choices(_store: &dyn EntityStore) -> StoreResult<Value> {
        Ok(Value::UNDEFINED)
    }

    fn add_url() -> String;

    fn cancel_url(instance: Option<&Self::Instance>) -> String;

    fn success_url(saved: &ObjectRef) -> String {
        saved.url.clone()
    }
}

pub async fn object_add<E: ObjectEditor>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    method: Method,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), E::PERMISSION)?;
    edit_view::<E>(&state, &user, flash, None, method, data).await
}

pub async fn object_edit<E: ObjectEditor>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    method: Method,
    Path(key): Path<String>,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), E::PERMISSION)?;
    let instance = E::get_object(state.deps.store(), &key)
        .await?
        .ok_or(ViewError::NotFound)?;
    edit_view::<E>(&state, &user, flash, Some(instance), method, data).await
}

/// Shared GET/POST flow once the instance (if any) is known.
pub(crate) async fn edit_view<E: ObjectEditor>(
    state: &AppState,
    user: &CurrentUser,
    flash: Flash,
    instance: Option<E::Instance>,
    method: Method,
    data: FormData,
) -> ViewResult<Response> {
    let store = state.deps.store();

    if method != Method::POST {
        let values = match &instance {
            Some(instance) => E::initial(instance),
            None => initial_from_query(&data, E::FIELDS_INITIAL),
        };
        return render_form::<E>(state, &flash, instance.as_ref(), values, FormErrors::new())
            .await;
    }

    let errors = match E::clean(store, &data, instance.as_ref()).await {
        Ok(input) => match E::save(store, instance.as_ref(), &input).await {
            Ok(saved) => {
                let verb = if instance.is_some() { "Modified" } else { "Created" };
                info!(
                    obj_type = E::OBJ_TYPE,
                    name = %saved.name,
                    user = user.username(),
                    "{} object",
                    verb
                );
                let message = Message::success(format!("{} {} {}", verb, E::OBJ_TYPE, saved.name));
                let to = if data.contains("_addanother") {
                    E::add_url()
                } else {
                    E::success_url(&saved)
                };
                return Ok(flash.redirect(&to, message));
            }
            Err(e) => conflict_as_form_error(e)?,
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Store(e)) => return Err(e.into()),
    };

    render_form::<E>(state, &flash, instance.as_ref(), data.values(), errors).await
}

async fn render_form<E: ObjectEditor>(
    state: &AppState,
    flash: &Flash,
    instance: Option<&E::Instance>,
    values: FormValues,
    errors: FormErrors,
) -> ViewResult<Response> {
    let choices = E::choices(state.deps.store()).await?;
    render(
        state,
        flash,
        E::TEMPLATE,
        context! {
            obj_type => E::OBJ_TYPE,
            obj => instance,
            is_edit => instance.is_some(),
            values => values,
            errors => errors,
            choices => choices,
            cancel_url => E::cancel_url(instance),
        },
    )
}
