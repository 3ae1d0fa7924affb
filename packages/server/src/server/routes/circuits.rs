use axum::{
    extract::{Path, Query},
    response::Response,
    Extension,
};
use minijinja::context;

use crate::common::{Actor, CircuitId, FormData, Permission};
use crate::domains::circuits::filters::CircuitFilter;
use crate::domains::circuits::models::{Choice, GraphType};
use crate::server::app::AppState;
use crate::server::error::{ViewError, ViewResult};
use crate::server::flash::Flash;
use crate::server::middleware::CurrentUser;
use crate::server::views::render;

/// Circuits with provider, type, tenant and site names and termination counts
pub async fn circuit_list(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Query(params): Query<FormData>,
) -> ViewResult<Response> {
    let store = state.deps.store();
    let filter = CircuitFilter::from_params(&params);
    let page = store
        .list_circuits(&filter, state.deps.page_request(&params))
        .await?;

    // Filter options are keyed by slug, matching the query parameters
    let providers: Vec<Choice> = store
        .all_providers()
        .await?
        .into_iter()
        .map(|p| Choice::new(p.slug, p.name))
        .collect();
    let types: Vec<Choice> = store
        .all_circuit_types()
        .await?
        .into_iter()
        .map(|t| Choice::new(t.slug, t.name))
        .collect();
    let tenants: Vec<Choice> = store
        .all_tenants()
        .await?
        .into_iter()
        .map(|t| Choice::new(t.slug, t.name))
        .collect();
    let sites: Vec<Choice> = store
        .all_sites()
        .await?
        .into_iter()
        .map(|s| Choice::new(s.slug, s.name))
        .collect();

    let actor = Actor::new(user.get());
    render(
        &state,
        &flash,
        "circuits/circuit_list.html",
        context! {
            page => page,
            filtered => filter.is_active(),
            filter => filter,
            querystring => params.to_query_string(&["page"]),
            filter_choices => context! {
                provider => providers,
                circuit_type => types,
                tenant => tenants,
                site => sites,
            },
            can_add => actor.has(Permission::ChangeCircuit),
            can_import => actor.has(Permission::AddCircuit),
            edit_permissions => context! {
                change => actor.has(Permission::ChangeCircuit),
                delete => actor.has(Permission::DeleteCircuit),
            },
        },
    )
}

pub async fn circuit_detail(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Path(pk): Path<String>,
) -> ViewResult<Response> {
    let store = state.deps.store();
    let id = CircuitId::parse(&pk).map_err(|_| ViewError::NotFound)?;
    let circuit = store.get_circuit(id).await?.ok_or(ViewError::NotFound)?;
    let terminations = store.terminations_for_circuit(id).await?;
    let termination_a = terminations.iter().find(|t| t.termination.term_side == "A");
    let termination_z = terminations.iter().find(|t| t.termination.term_side == "Z");
    let show_graphs = store.graphs_exist(GraphType::Provider).await?;

    let actor = Actor::new(user.get());
    render(
        &state,
        &flash,
        "circuits/circuit.html",
        context! {
            circuit => circuit,
            termination_a => termination_a,
            termination_z => termination_z,
            show_graphs => show_graphs,
            can_change => actor.has(Permission::ChangeCircuit),
            can_delete => actor.has(Permission::DeleteCircuit),
        },
    )
}
