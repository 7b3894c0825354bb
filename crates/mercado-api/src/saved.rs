use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use mercado_types::api::{Envelope, NicknameQuery, UserListingParams};

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};
use crate::extract::Payload;

/// GET /BuscarPublicacionesGuardadas?nickname=
pub async fn saved_listings(
    State(state): State<AppState>,
    Query(query): Query<NicknameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .saved_listings(query.nickname.into())
        .await
        .or_gateway("Error al buscar publicaciones guardadas")?;
    Ok(Json(Envelope { message: "Publicaciones guardadas encontradas", results }))
}

/// GET /ComprobarGuardados?idPublicacion=&nickname=
pub async fn check_saved(
    State(state): State<AppState>,
    Query(query): Query<UserListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .is_saved(query.nickname.into(), query.id_publicacion.into())
        .await
        .or_gateway("Error al comprobar guardados")?;
    Ok(Json(Envelope { message: "Comprobar guardado", results }))
}

/// POST /GuardarPublicacion
pub async fn save_listing(
    State(state): State<AppState>,
    Payload(req): Payload<UserListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .save_listing(req.nickname.into(), req.id_publicacion.into())
        .await
        .or_gateway("Error al guardar la publicación")?;
    Ok(Json(Envelope { message: "Publicación guardada exitosamente", results }))
}
