use async_trait::async_trait;
use axum::{
    extract::{Form, Path},
    http::Method,
    response::Response,
    Extension,
};
use minijinja::context;
use tracing::{info, warn};

use super::{render, ObjectRef};
use crate::common::{require, FormData, Permission};
use crate::domains::circuits::forms::{FormErrors, REQUIRED};
use crate::kernel::{EntityStore, StoreError, StoreResult};
use crate::server::app::AppState;
use crate::server::error::{ViewError, ViewResult};
use crate::server::flash::{Flash, Message};
use crate::server::middleware::CurrentUser;

pub const DELETE_TEMPLATE: &str = "utilities/obj_delete.html";

/// Describes how one entity is deleted after confirmation.
#[async_trait]
pub trait ObjectDeleter: Send + Sync + 'static {
    type Instance: Send + Sync;

    const OBJ_TYPE: &'static str;
    const PERMISSION: Permission;
    const TEMPLATE: &'static str = DELETE_TEMPLATE;

    async fn get_object(store: &dyn EntityStore, key: &str)
        -> StoreResult<Option<Self::Instance>>;

    fn describe(instance: &Self::Instance) -> ObjectRef;

    async fn delete(store: &dyn EntityStore, instance: &Self::Instance) -> StoreResult<u64>;

    /// List page to return to after a successful delete
    fn list_url() -> String;

    fn success_message(instance: &Self::Instance) -> String {
        format!("Deleted {} {}", Self::OBJ_TYPE, Self::describe(instance).name)
    }

    fn success_url(_instance: &Self::Instance) -> String {
        Self::list_url()
    }

    fn cancel_url(instance: &Self::Instance) -> String {
        Self::describe(instance).url
    }
}

pub async fn object_delete<D: ObjectDeleter>(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    method: Method,
    Path(key): Path<String>,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), D::PERMISSION)?;
    let store = state.deps.store();
    let instance = D::get_object(store, &key)
        .await?
        .ok_or(ViewError::NotFound)?;
    let object = D::describe(&instance);

    let mut errors = FormErrors::new();
    if method == Method::POST {
        if data.is_checked("confirm") {
            return match D::delete(store, &instance).await {
                Ok(_) => {
                    info!(
                        obj_type = D::OBJ_TYPE,
                        name = %object.name,
                        user = user.username(),
                        "Deleted object"
                    );
                    let message = Message::success(D::success_message(&instance));
                    Ok(flash.redirect(&D::success_url(&instance), message))
                }
                Err(e @ StoreError::Protected { .. }) => {
                    warn!(obj_type = D::OBJ_TYPE, name = %object.name, error = %e, "Delete refused");
                    let message = Message::error(format!(
                        "Unable to delete {} {}: {}",
                        D::OBJ_TYPE,
                        object.name,
                        e
                    ));
                    Ok(flash.redirect(&object.url, message))
                }
                Err(e) => Err(e.into()),
            };
        }
        errors.add("confirm", REQUIRED);
    }

    render(
        &state,
        &flash,
        D::TEMPLATE,
        context! {
            obj_type => D::OBJ_TYPE,
            obj => object,
            errors => errors,
            cancel_url => D::cancel_url(&instance),
        },
    )
}
