use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use mercado_db::queries::NewListing;
use mercado_types::api::{
    CreateListingRequest, Envelope, ListingQuery, OwnerQuery, SearchQuery, UserListingParams,
};

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};
use crate::extract::Payload;

const LIST_ERROR: &str = "Error al obtener las publicaciones";

/// GET /ObtenerPublicaciones
pub async fn all_listings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let results = state.db.all_listings().await.or_gateway(LIST_ERROR)?;
    Ok(Json(Envelope { message: "Publicaciones obtenidas", results }))
}

/// GET /BuscarPublicaciones?searchTerm=
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .search_listings(query.search_term.into())
        .await
        .or_gateway("Error al buscar publicaciones")?;
    Ok(Json(Envelope { message: "Publicaciones encontradas", results }))
}

/// GET /ObtenerPublicacion?idPublicacion=
pub async fn get_listing(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .listing(query.id_publicacion.into())
        .await
        .or_gateway("Error al obtener la publicación")?;
    Ok(Json(Envelope { message: "Publicación obtenida", results }))
}

/// GET /ObtenerMisPublicaciones?idUsuario=
pub async fn my_listings(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .listings_by_owner(query.id_usuario.into())
        .await
        .or_gateway(LIST_ERROR)?;
    Ok(Json(Envelope { message: "Publicaciones obtenidas", results }))
}

/// POST /CrearPublicacion
pub async fn create_listing(
    State(state): State<AppState>,
    Payload(req): Payload<CreateListingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = NewListing {
        nickname: req.nickname.into(),
        nombre: req.nombre.into(),
        precio: req.precio.into(),
        tunidad: req.tunidad.into(),
        cantidad: req.cantidad.into(),
        descripcion: req.descripcion.into(),
        foto: req.foto.into(),
    };

    let results = state
        .db
        .create_listing(listing)
        .await
        .or_gateway("Error al crear la publicación")?;
    Ok(Json(Envelope { message: "Publicación creada exitosamente", results }))
}

/// DELETE /EliminarPublicacion?nickname=&idPublicacion=
pub async fn delete_listing(
    State(state): State<AppState>,
    Query(query): Query<UserListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .db
        .delete_listing(query.nickname.into(), query.id_publicacion.into())
        .await
        .or_gateway("Error al eliminar la publicación")?;
    Ok(Json(Envelope { message: "Publicación eliminada exitosamente", results }))
}
