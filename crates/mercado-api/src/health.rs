use axum::{Json, extract::State, response::IntoResponse};

use mercado_types::api::MessageBody;

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};

/// GET /test-connection: borrow one pooled connection and release it.
pub async fn test_connection(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.db.ping().await.or_gateway("Error al conectar a la base de datos")?;
    Ok(Json(MessageBody { message: "Conexión exitosa a la base de datos".into() }))
}
