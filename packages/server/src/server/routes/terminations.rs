use axum::{
    extract::{Form, Path},
    http::Method,
    response::Response,
    Extension,
};
use minijinja::context;
use tracing::info;

use crate::common::{require, CircuitId, FormData, Permission};
use crate::domains::circuits::forms::{clean_termination, FormError, FormErrors};
use crate::domains::circuits::views::{saved_termination, termination_choices, TerminationEditor};
use crate::server::app::AppState;
use crate::server::error::{ViewError, ViewResult};
use crate::server::flash::{Flash, Message};
use crate::server::middleware::CurrentUser;
use crate::server::views::{conflict_as_form_error, initial_from_query, render, ObjectEditor};

/// Add a termination to circuit `pk`.
///
/// The owning circuit always comes from the URL; a `circuit` field in the
/// submitted form is never read.
pub async fn termination_add(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    flash: Flash,
    method: Method,
    Path(pk): Path<String>,
    Form(data): Form<FormData>,
) -> ViewResult<Response> {
    require(user.get(), Permission::ChangeCircuit)?;
    let store = state.deps.store();
    let id = CircuitId::parse(&pk).map_err(|_| ViewError::NotFound)?;
    let circuit = store.get_circuit(id).await?.ok_or(ViewError::NotFound)?;
    let circuit_url = circuit.absolute_url();
    let add_url = format!("{}terminations/add/", circuit_url);

    let mut values = initial_from_query(&data, TerminationEditor::FIELDS_INITIAL);
    let mut errors = FormErrors::new();
    if method == Method::POST {
        errors = match clean_termination(store, &data, id, None).await {
            Ok(input) => match store.insert_termination(id, &input).await {
                Ok(created) => {
                    let row = saved_termination(store, created.id).await?;
                    info!(
                        obj_type = "termination",
                        name = %row,
                        user = user.username(),
                        "Created object"
                    );
                    let message = Message::success(format!("Created termination {}", row));
                    let to = if data.contains("_addanother") {
                        &add_url
                    } else {
                        &circuit_url
                    };
                    return Ok(flash.redirect(to, message));
                }
                Err(e) => conflict_as_form_error(e)?,
            },
            Err(FormError::Invalid(errors)) => errors,
            Err(FormError::Store(e)) => return Err(e.into()),
        };
        values = data.values();
    }

    let choices = termination_choices(store).await?;
    render(
        &state,
        &flash,
        TerminationEditor::TEMPLATE,
        context! {
            obj_type => "termination",
            is_edit => false,
            circuit_name => circuit.to_string(),
            circuit_url => &circuit_url,
            add_url => &add_url,
            values => values,
            errors => errors,
            choices => choices,
            cancel_url => &circuit_url,
        },
    )
}
