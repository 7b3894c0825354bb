use serde::{Deserialize, Serialize};

use crate::params::SqlParam;

// -- Envelopes --

/// Success body shared by every gateway route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub results: T,
}

/// Failure body. `details` carries the driver message when the route exposes it.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub nickname: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nickname: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBuyerRequest {
    pub nickname: Option<SqlParam>,
    pub pass: Option<SqlParam>,
    pub nombres: Option<SqlParam>,
    pub apellido_p: Option<SqlParam>,
    pub apellido_m: Option<SqlParam>,
    pub fecha_n: Option<SqlParam>,
    pub correo: Option<SqlParam>,
    pub telefono: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerRequest {
    pub nickname: Option<SqlParam>,
    pub pass: Option<SqlParam>,
    pub nombres: Option<SqlParam>,
    pub apellido_p: Option<SqlParam>,
    pub apellido_m: Option<SqlParam>,
    pub fecha_n: Option<SqlParam>,
    pub correo: Option<SqlParam>,
    pub telefono: Option<SqlParam>,
    pub calle: Option<SqlParam>,
    pub colonia: Option<SqlParam>,
    pub lote: Option<SqlParam>,
    pub municipio: Option<SqlParam>,
}

// -- Listings --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub nickname: Option<SqlParam>,
    pub nombre: Option<SqlParam>,
    pub precio: Option<SqlParam>,
    pub tunidad: Option<SqlParam>,
    pub cantidad: Option<SqlParam>,
    pub descripcion: Option<SqlParam>,
    pub foto: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub id_publicacion: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub id_usuario: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
pub struct NicknameQuery {
    pub nickname: Option<SqlParam>,
}

/// Nickname + listing pair, used by the saved-listing and delete routes
/// from either the query string or the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListingParams {
    pub nickname: Option<SqlParam>,
    pub id_publicacion: Option<SqlParam>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub nickname: Option<SqlParam>,
    pub id_publicacion: Option<SqlParam>,
    pub comentario: Option<SqlParam>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub nickname1: Option<SqlParam>,
    pub nickname2: Option<SqlParam>,
    pub mensaje: Option<SqlParam>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub nickname1: Option<SqlParam>,
    pub nickname2: Option<SqlParam>,
}
