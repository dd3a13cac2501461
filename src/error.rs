//! Error taxonomy for the capability request path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::engine::EngineError;

/// Failure of a single capability request.
///
/// Every variant surfaces as the same uniform failure response: HTTP 500
/// with a body naming the error kind and carrying the underlying message.
#[derive(Debug, Error)]
pub enum Error {
    /// The prompt template itself could not be rendered. Declared
    /// placeholders are pre-filled before rendering, so this indicates
    /// drift between a template and its declared placeholder set.
    #[error("prompt rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    /// The completion engine failed or returned an unusable response.
    #[error(transparent)]
    Execution(#[from] EngineError),

    /// The request itself was unusable, for example an empty user id.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Stable kind tag carried in failure bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Render(_) => "render",
            Error::Execution(_) => "execution",
            Error::Validation(_) => "validation",
        }
    }
}

/// Body of every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        };
        error!(kind = body.error, detail = %body.detail, "capability request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
