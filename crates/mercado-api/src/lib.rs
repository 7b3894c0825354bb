pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod health;
pub mod listings;
pub mod messages;
pub mod password;
pub mod saved;
pub mod uploads;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use mercado_db::Database;
use mercado_storage::ObjectStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub store: Arc<dyn ObjectStore>,
}

/// Every marketplace route. Session, CORS and body-limit layers are applied
/// by the caller so tests can swap the session store.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/test-connection", get(health::test_connection))
        // Accounts
        .route("/Login", post(auth::login))
        .route("/RegistrarCliente", post(auth::register_buyer))
        .route("/RegistrarVendedor", post(auth::register_seller))
        .route("/Sesion", get(auth::current_session))
        .route("/CerrarSesion", post(auth::logout))
        // Listings
        .route("/ObtenerPublicaciones", get(listings::all_listings))
        .route("/BuscarPublicaciones", get(listings::search_listings))
        .route("/ObtenerPublicacion", get(listings::get_listing))
        .route("/ObtenerMisPublicaciones", get(listings::my_listings))
        .route("/CrearPublicacion", post(listings::create_listing))
        .route("/EliminarPublicacion", delete(listings::delete_listing))
        // Saved listings
        .route("/BuscarPublicacionesGuardadas", get(saved::saved_listings))
        .route("/ComprobarGuardados", get(saved::check_saved))
        .route("/GuardarPublicacion", post(saved::save_listing))
        // Comments
        .route("/ObtenerComentarios", get(comments::list_comments))
        .route("/Comentar", post(comments::add_comment))
        // Messages
        .route("/obtenerUltimosMensajes", get(messages::latest_messages))
        .route("/enviarMensaje", post(messages::send_message))
        .route("/obtenerConversacion", get(messages::conversation))
        // Uploads
        .route("/SubirImagen", post(uploads::upload_image))
        .with_state(state)
}
