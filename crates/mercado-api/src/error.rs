use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use mercado_types::api::{ErrorBody, MessageBody};

pub const NO_FILE_MESSAGE: &str = "No se ha enviado ninguna imagen.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Error al subir la imagen.";
pub const BAD_REQUEST_MESSAGE: &str = "Solicitud inválida";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Database or session failure; the driver message goes back to the client.
    #[error("{context}: {details}")]
    Gateway { context: &'static str, details: String },

    /// Failure reported to the client without details.
    #[error("{0}")]
    Opaque(&'static str),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no file in upload")]
    MissingFile,

    #[error("upload failed: {0}")]
    Upload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gateway { context, details } => {
                error!("{}: {}", context, details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody { error: context.to_string(), details: Some(details) }),
                )
                    .into_response()
            }
            ApiError::Opaque(context) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: context.to_string(), details: None }),
            )
                .into_response(),
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(MessageBody { message: message.to_string() }),
            )
                .into_response(),
            ApiError::BadRequest(details) => {
                warn!("Rejected request body: {}", details);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody { error: BAD_REQUEST_MESSAGE.to_string(), details: Some(details) }),
                )
                    .into_response()
            }
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, NO_FILE_MESSAGE).into_response(),
            ApiError::Upload(details) => {
                error!("Error al subir la imagen: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageBody { message: UPLOAD_FAILED_MESSAGE.to_string() }),
                )
                    .into_response()
            }
        }
    }
}

/// Attach the route's client-facing error text to a gateway result.
pub trait GatewayResultExt<T> {
    /// 500 with `{error, details}`.
    fn or_gateway(self, context: &'static str) -> Result<T, ApiError>;
    /// 500 with `{error}` only; the cause is logged here.
    fn or_opaque(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> GatewayResultExt<T> for anyhow::Result<T> {
    fn or_gateway(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::Gateway { context, details: e.to_string() })
    }

    fn or_opaque(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            error!("{}: {:#}", context, e);
            ApiError::Opaque(context)
        })
    }
}
