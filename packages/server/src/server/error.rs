use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::common::AuthError;
use crate::kernel::{RenderError, StoreError};

/// Everything a view can fail with, short of a validation error (which
/// re-renders the form instead).
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type ViewResult<T> = Result<T, ViewError>;

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self {
            ViewError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(error_page(
                    "Page Not Found",
                    "The requested page does not exist.",
                )),
            )
                .into_response(),
            ViewError::Forbidden(e) => (
                StatusCode::FORBIDDEN,
                Html(error_page("Access Denied", &e.to_string())),
            )
                .into_response(),
            ViewError::Store(e) => {
                tracing::error!(error = %e, "Store error while handling request");
                server_error()
            }
            ViewError::Render(e) => {
                tracing::error!(error = %e, "Template rendering failed");
                server_error()
            }
        }
    }
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(error_page(
            "Server Error",
            "There was a problem with your request.",
        )),
    )
        .into_response()
}

// Error pages are static so they render even when templates are broken
fn error_page(title: &str, detail: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/static/circuits.css\"></head>\
         <body><div class=\"container\"><h1>{title}</h1><p>{detail}</p>\
         <p><a href=\"/circuits/circuits/\">Back to circuits</a></p></div></body></html>"
    )
}
