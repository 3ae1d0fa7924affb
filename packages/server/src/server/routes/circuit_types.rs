use axum::{extract::Query, response::Response, Extension};
use minijinja::context;

use crate::common::{Actor, FormData, Permission};
use crate::server::app::AppState;
use crate::server::error::ViewResult;
use crate::server::flash::Flash;
use crate::server::middleware::CurrentUser;
use crate::server::views::render;

/// Circuit types annotated with how many circuits use each
pub async fn circuit_type_list(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Query(params): Query<FormData>,
) -> ViewResult<Response> {
    let page = state
        .deps
        .store()
        .list_circuit_types(state.deps.page_request(&params))
        .await?;

    let actor = Actor::new(user.get());
    render(
        &state,
        &flash,
        "circuits/circuittype_list.html",
        context! {
            page => page,
            querystring => params.to_query_string(&["page"]),
            can_add => actor.has(Permission::ChangeCircuitType),
            edit_permissions => context! {
                change => actor.has(Permission::ChangeCircuitType),
                delete => actor.has(Permission::DeleteCircuitType),
            },
        },
    )
}
