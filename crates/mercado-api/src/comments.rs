use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use mercado_types::api::{CommentRequest, Envelope, ListingQuery};

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};
use crate::extract::Payload;

pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .comments(query.id_publicacion.into())
        .await
        .or_gateway("Error al obtener comentarios")?;
    Ok(Json(Envelope { message: "Comentarios obtenidos", results }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Payload(req): Payload<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The procedure takes the listing first.
    let results = state
        .db
        .add_comment(req.id_publicacion.into(), req.nickname.into(), req.comentario.into())
        .await
        .or_gateway("Error al crear comentario")?;
    Ok(Json(Envelope { message: "Comentario creado exitosamente", results }))
}
