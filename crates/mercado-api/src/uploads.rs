use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use mercado_storage::{DEFAULT_CONTENT_TYPE, Upload, timestamped_name};
use mercado_types::api::UploadResponse;

use crate::AppState;
use crate::error::ApiError;

/// Multipart field that carries the image.
pub const FILE_FIELD: &str = "file";

/// POST /SubirImagen: forwards the `file` part to the configured object store.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A request that is not multipart at all has no file either.
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::MissingFile);
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.body_text()))?
    {
        // A `file` text field without a filename is not an attachment.
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let bytes = field.bytes().await.map_err(|e| ApiError::Upload(e.body_text()))?;

        upload = Some(Upload {
            file_name: timestamped_name(&original, Utc::now()),
            content_type,
            bytes,
        });
        break;
    }

    let upload = upload.ok_or(ApiError::MissingFile)?;
    let name = upload.file_name.clone();
    let size = upload.bytes.len();

    let url = state
        .store
        .put(upload)
        .await
        .map_err(|e| ApiError::Upload(format!("{:#}", e)))?;

    info!("Uploaded {} ({} bytes) via {}: {}", name, size, state.store.kind(), url);
    Ok(Json(UploadResponse { url }))
}
