use axum::{Json, extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::info;

use mercado_db::models::JsonRow;
use mercado_db::queries::{NewBuyer, NewSeller};
use mercado_types::api::{
    Envelope, LoginRequest, MessageBody, RegisterBuyerRequest, RegisterSellerRequest,
    SessionResponse,
};
use mercado_types::params::SqlParam;

use crate::AppState;
use crate::error::{ApiError, GatewayResultExt};
use crate::extract::Payload;
use crate::password::{hash_password, verify_password};

/// Session key holding the logged-in nickname.
pub const SESSION_NICKNAME_KEY: &str = "nickname";

/// Column of `usuarios` that stores the password hash.
const PASSWORD_COLUMN: &str = "pass";

const LOGIN_ERROR: &str = "Error al verificar las credenciales";
const BAD_CREDENTIALS: &str = "Credenciales incorrectas";
const REGISTER_BUYER_ERROR: &str = "Error al registrar el cliente";
const REGISTER_SELLER_ERROR: &str = "Error al registrar el vendedor";
const NO_SESSION: &str = "Sesión no iniciada";
const SESSION_ERROR: &str = "Error al leer la sesión";

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Payload(req): Payload<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(nickname), Some(password)) = (req.nickname, req.password) else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    };
    info!("Login attempt for {}", nickname);

    let rows = state.db.users_by_nickname(&nickname).await.or_gateway(LOGIN_ERROR)?;
    let results = matching_rows(rows, &password);

    if results.is_empty() {
        info!("Login rejected for {}", nickname);
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::Gateway { context: LOGIN_ERROR, details: e.to_string() })?;
    session
        .insert(SESSION_NICKNAME_KEY, &nickname)
        .await
        .map_err(|e| ApiError::Gateway { context: LOGIN_ERROR, details: e.to_string() })?;

    Ok(Json(Envelope { message: "usuario valido", results }))
}

/// Rows whose stored hash verifies against `password`, with the hash column removed.
fn matching_rows(rows: Vec<JsonRow>, password: &str) -> Vec<JsonRow> {
    rows.into_iter()
        .filter_map(|mut row| {
            let verified = row
                .get(PASSWORD_COLUMN)
                .and_then(|v| v.as_str())
                .is_some_and(|stored| verify_password(password, stored));
            if !verified {
                return None;
            }
            row.shift_remove(PASSWORD_COLUMN);
            Some(row)
        })
        .collect()
}

/// Replace a cleartext password with its hash. Absent stays absent.
fn hashed(pass: Option<SqlParam>) -> anyhow::Result<SqlParam> {
    match pass {
        None | Some(SqlParam::Null) => Ok(SqlParam::Null),
        Some(plain) => Ok(SqlParam::Text(hash_password(&plain.to_string())?)),
    }
}

pub async fn register_buyer(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterBuyerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let buyer = NewBuyer {
        nickname: req.nickname.into(),
        pass: hashed(req.pass).or_gateway(REGISTER_BUYER_ERROR)?,
        nombres: req.nombres.into(),
        apellido_p: req.apellido_p.into(),
        apellido_m: req.apellido_m.into(),
        fecha_n: req.fecha_n.into(),
        correo: req.correo.into(),
    };

    let results = state.db.register_buyer(buyer).await.or_gateway(REGISTER_BUYER_ERROR)?;
    Ok(Json(Envelope { message: "Cliente registrado exitosamente", results }))
}

pub async fn register_seller(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterSellerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let seller = NewSeller {
        nickname: req.nickname.into(),
        pass: hashed(req.pass).or_gateway(REGISTER_SELLER_ERROR)?,
        nombres: req.nombres.into(),
        apellido_p: req.apellido_p.into(),
        apellido_m: req.apellido_m.into(),
        fecha_n: req.fecha_n.into(),
        correo: req.correo.into(),
        telefono: req.telefono.into(),
        calle: req.calle.into(),
        colonia: req.colonia.into(),
        lote: req.lote.into(),
        municipio: req.municipio.into(),
    };

    let results = state.db.register_seller(seller).await.or_gateway(REGISTER_SELLER_ERROR)?;
    Ok(Json(Envelope { message: "Vendedor registrado exitosamente", results }))
}

/// GET /Sesion: nickname stored by the last successful login.
pub async fn current_session(session: Session) -> Result<impl IntoResponse, ApiError> {
    let nickname = session
        .get::<String>(SESSION_NICKNAME_KEY)
        .await
        .map_err(|e| ApiError::Gateway { context: SESSION_ERROR, details: e.to_string() })?
        .ok_or(ApiError::Unauthorized(NO_SESSION))?;
    Ok(Json(SessionResponse { nickname }))
}

/// POST /CerrarSesion
pub async fn logout(session: Session) -> Result<impl IntoResponse, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::Gateway { context: SESSION_ERROR, details: e.to_string() })?;
    Ok(Json(MessageBody { message: "Sesión cerrada".into() }))
}
