use axum::{
    Router,
    routing::{get, post},
};

pub mod chat;
pub mod inventory;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/tools/inventory-search", post(inventory::tool_search))
        .route("/chatFlow", post(chat::chat_flow))
        .nest("/inventory", inventory::router())
}
