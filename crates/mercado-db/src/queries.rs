use anyhow::Result;
use futures_util::TryStreamExt;
use mercado_types::params::SqlParam;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::{Either, Executor};
use tracing::debug;

use crate::Database;
use crate::models::{CallItem, CallOutcome, JsonRow, row_to_json};

// -- Statements --

pub const SELECT_USER_BY_NICKNAME: &str = "SELECT * FROM usuarios WHERE nickname = ?";
pub const REGISTER_BUYER: &str = "CALL RegistrarCliente(?, ?, ?, ?, ?, ?, ?, 0)";
pub const REGISTER_SELLER: &str =
    "CALL RegistrarVendedor(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
pub const SELECT_ALL_LISTINGS: &str = "SELECT * FROM publicaciones";
pub const SEARCH_LISTINGS: &str = "CALL BuscarPublicacionesPorNombre(?)";
pub const GET_LISTING: &str = "CALL Obtenerpublicacion(?)";
pub const SELECT_LISTINGS_BY_OWNER: &str = "SELECT * FROM publicaciones WHERE idUsuario = ?";
pub const CREATE_LISTING: &str = "CALL CrearPublicacion(?, ?, ?, ?, ?, ?, ?)";
pub const SAVED_LISTINGS: &str = "CALL BuscarPublicacionesGuardadas(?)";
pub const GET_COMMENTS: &str = "CALL ObtenerComentarios(?)";
pub const CHECK_SAVED: &str = "CALL ComprobarGuardados(?, ?)";
pub const DELETE_LISTING: &str = "CALL EliminarPublicacion(?, ?)";
pub const SAVE_LISTING: &str = "CALL GuardarPublicacion(?, ?)";
pub const ADD_COMMENT: &str = "CALL Comentar(?, ?, ?)";
pub const LATEST_MESSAGES: &str = "CALL ObtenerUltimosMensajes(?)";
pub const SEND_MESSAGE: &str = "CALL EnviarMensaje(?, ?, ?)";
pub const GET_CONVERSATION: &str = "CALL ObtenerConversacion(?, ?)";

/// Buyer registration, with `pass` already hashed.
pub struct NewBuyer {
    pub nickname: SqlParam,
    pub pass: SqlParam,
    pub nombres: SqlParam,
    pub apellido_p: SqlParam,
    pub apellido_m: SqlParam,
    pub fecha_n: SqlParam,
    pub correo: SqlParam,
}

/// Seller registration, with `pass` already hashed.
pub struct NewSeller {
    pub nickname: SqlParam,
    pub pass: SqlParam,
    pub nombres: SqlParam,
    pub apellido_p: SqlParam,
    pub apellido_m: SqlParam,
    pub fecha_n: SqlParam,
    pub correo: SqlParam,
    pub telefono: SqlParam,
    pub calle: SqlParam,
    pub colonia: SqlParam,
    pub lote: SqlParam,
    pub municipio: SqlParam,
}

pub struct NewListing {
    pub nickname: SqlParam,
    pub nombre: SqlParam,
    pub precio: SqlParam,
    pub tunidad: SqlParam,
    pub cantidad: SqlParam,
    pub descripcion: SqlParam,
    pub foto: SqlParam,
}

impl Database {
    // -- Generic gateway --

    /// Run a literal statement and return its rows.
    pub async fn select(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<JsonRow>> {
        debug!(sql, params = params.len(), "select");
        let rows = bind_all(sqlx::query(sql), params).fetch_all(&self.pool).await?;
        let rows = rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Run a `CALL`, keeping every result set the procedure produced.
    pub async fn call(&self, sql: &str, params: &[SqlParam]) -> Result<CallOutcome> {
        debug!(sql, params = params.len(), "call");
        let mut stream = self.pool.fetch_many(bind_all(sqlx::query(sql), params));

        let mut items = Vec::new();
        while let Some(item) = stream.try_next().await? {
            items.push(match item {
                Either::Left(done) => CallItem::Done {
                    affected_rows: done.rows_affected(),
                    insert_id: done.last_insert_id(),
                },
                Either::Right(row) => CallItem::Row(row_to_json(&row)?),
            });
        }

        Ok(CallOutcome::collect(items))
    }

    // -- Users --

    pub async fn users_by_nickname(&self, nickname: &str) -> Result<Vec<JsonRow>> {
        self.select(SELECT_USER_BY_NICKNAME, &[SqlParam::from(nickname)]).await
    }

    pub async fn register_buyer(&self, buyer: NewBuyer) -> Result<CallOutcome> {
        self.call(
            REGISTER_BUYER,
            &[
                buyer.nickname,
                buyer.pass,
                buyer.nombres,
                buyer.apellido_p,
                buyer.apellido_m,
                buyer.fecha_n,
                buyer.correo,
            ],
        )
        .await
    }

    pub async fn register_seller(&self, seller: NewSeller) -> Result<CallOutcome> {
        self.call(
            REGISTER_SELLER,
            &[
                seller.nickname,
                seller.pass,
                seller.nombres,
                seller.apellido_p,
                seller.apellido_m,
                seller.fecha_n,
                seller.correo,
                seller.telefono,
                seller.calle,
                seller.colonia,
                seller.lote,
                seller.municipio,
            ],
        )
        .await
    }

    // -- Listings --

    pub async fn all_listings(&self) -> Result<Vec<JsonRow>> {
        self.select(SELECT_ALL_LISTINGS, &[]).await
    }

    pub async fn search_listings(&self, term: SqlParam) -> Result<CallOutcome> {
        self.call(SEARCH_LISTINGS, &[term]).await
    }

    pub async fn listing(&self, listing_id: SqlParam) -> Result<CallOutcome> {
        self.call(GET_LISTING, &[listing_id]).await
    }

    pub async fn listings_by_owner(&self, owner_id: SqlParam) -> Result<Vec<JsonRow>> {
        self.select(SELECT_LISTINGS_BY_OWNER, &[owner_id]).await
    }

    pub async fn create_listing(&self, listing: NewListing) -> Result<CallOutcome> {
        self.call(
            CREATE_LISTING,
            &[
                listing.nickname,
                listing.nombre,
                listing.precio,
                listing.tunidad,
                listing.cantidad,
                listing.descripcion,
                listing.foto,
            ],
        )
        .await
    }

    pub async fn delete_listing(&self, nickname: SqlParam, listing_id: SqlParam) -> Result<CallOutcome> {
        self.call(DELETE_LISTING, &[nickname, listing_id]).await
    }

    // -- Saved listings --

    pub async fn saved_listings(&self, nickname: SqlParam) -> Result<CallOutcome> {
        self.call(SAVED_LISTINGS, &[nickname]).await
    }

    pub async fn is_saved(&self, nickname: SqlParam, listing_id: SqlParam) -> Result<CallOutcome> {
        self.call(CHECK_SAVED, &[nickname, listing_id]).await
    }

    /// Toggles the saved state; the procedure checks for an existing row first.
    pub async fn save_listing(&self, nickname: SqlParam, listing_id: SqlParam) -> Result<CallOutcome> {
        self.call(SAVE_LISTING, &[nickname, listing_id]).await
    }

    // -- Comments --

    pub async fn comments(&self, listing_id: SqlParam) -> Result<CallOutcome> {
        self.call(GET_COMMENTS, &[listing_id]).await
    }

    pub async fn add_comment(
        &self,
        listing_id: SqlParam,
        nickname: SqlParam,
        text: SqlParam,
    ) -> Result<CallOutcome> {
        self.call(ADD_COMMENT, &[listing_id, nickname, text]).await
    }

    // -- Messages --

    pub async fn latest_messages(&self, nickname: SqlParam) -> Result<CallOutcome> {
        self.call(LATEST_MESSAGES, &[nickname]).await
    }

    pub async fn send_message(
        &self,
        from: SqlParam,
        to: SqlParam,
        text: SqlParam,
    ) -> Result<CallOutcome> {
        self.call(SEND_MESSAGE, &[from, to, text]).await
    }

    pub async fn conversation(&self, first: SqlParam, second: SqlParam) -> Result<CallOutcome> {
        self.call(GET_CONVERSATION, &[first, second]).await
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param.clone() {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Bool(v) => query.bind(v),
            SqlParam::Int(v) => query.bind(v),
            SqlParam::Float(v) => query.bind(v),
            SqlParam::Text(v) => query.bind(v),
        };
    }
    query
}
