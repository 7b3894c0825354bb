//! Two-party messaging. Unlike the other gateway routes, reads answer with
//! the bare first result set and failures carry no driver details.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use mercado_types::api::{ConversationQuery, MessageBody, NicknameQuery, SendMessageRequest};

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};
use crate::extract::Payload;

/// GET /obtenerUltimosMensajes?nickname=
pub async fn latest_messages(
    State(state): State<AppState>,
    Query(query): Query<NicknameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .db
        .latest_messages(query.nickname.into())
        .await
        .or_opaque("Error al obtener los últimos mensajes")?;
    Ok(Json(outcome.into_first_set()))
}

/// POST /enviarMensaje
pub async fn send_message(
    State(state): State<AppState>,
    Payload(req): Payload<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .send_message(req.nickname1.into(), req.nickname2.into(), req.mensaje.into())
        .await
        .or_opaque("Error al enviar el mensaje")?;
    Ok(Json(MessageBody { message: "Mensaje enviado correctamente".into() }))
}

/// GET /obtenerConversacion?nickname1=&nickname2=
pub async fn conversation(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .db
        .conversation(query.nickname1.into(), query.nickname2.into())
        .await
        .or_opaque("Error al obtener la conversación")?;
    Ok(Json(outcome.into_first_set()))
}
