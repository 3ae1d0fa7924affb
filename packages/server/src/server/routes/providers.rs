use axum::{
    extract::{Path, Query},
    response::Response,
    Extension,
};
use minijinja::context;

use crate::common::{Actor, FormData, Permission};
use crate::domains::circuits::filters::ProviderFilter;
use crate::domains::circuits::models::{Choice, GraphType};
use crate::server::app::AppState;
use crate::server::error::{ViewError, ViewResult};
use crate::server::flash::Flash;
use crate::server::middleware::CurrentUser;
use crate::server::views::render;

/// Providers annotated with their circuit counts
pub async fn provider_list(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Query(params): Query<FormData>,
) -> ViewResult<Response> {
    let store = state.deps.store();
    let filter = ProviderFilter::from_params(&params);
    let page = store
        .list_providers(&filter, state.deps.page_request(&params))
        .await?;
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
        "circuits/provider_list.html",
        context! {
            page => page,
            filtered => filter.is_active(),
            filter => filter,
            querystring => params.to_query_string(&["page"]),
            sites => sites,
            can_add => actor.has(Permission::AddProvider),
            edit_permissions => context! {
                change => actor.has(Permission::ChangeProvider),
                delete => actor.has(Permission::DeleteProvider),
            },
        },
    )
}

pub async fn provider_detail(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    Path(slug): Path<String>,
) -> ViewResult<Response> {
    let store = state.deps.store();
    let provider = store
        .get_provider_by_slug(&slug)
        .await?
        .ok_or(ViewError::NotFound)?;
    let circuits = store.circuits_for_provider(provider.id).await?;
    let show_graphs = store.graphs_exist(GraphType::Provider).await?;

    let actor = Actor::new(user.get());
    render(
        &state,
        &flash,
        "circuits/provider.html",
        context! {
            provider => provider,
            circuits => circuits,
            show_graphs => show_graphs,
            can_change => actor.has(Permission::ChangeProvider),
            can_delete => actor.has(Permission::DeleteProvider),
            can_add_circuit => actor.has(Permission::ChangeCircuit),
        },
    )
}
