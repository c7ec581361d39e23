//! API routes for the RAG server

pub mod add;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query_rag))
        .route("/add", post(add::add_document))
        .route("/info", get(info))
}

/// GET /info - service description
async fn info(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let service = state.service();
    let documents = service.store().count().await?;

    Ok(Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "store": service.store().name(),
        "llm": service.llm().name(),
        "model": service.model(),
        "documents": documents,
        "endpoints": {
            "POST /query?q=": "Answer a question from the best-matching document",
            "POST /add?doc=": "Store a document under a generated id",
        }
    })))
}
