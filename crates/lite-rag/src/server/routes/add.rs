//! Add-document endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AddParams, AddResponse};

/// POST /add?doc=... - store a document under a generated id
pub async fn add_document(
    State(state): State<AppState>,
    Query(params): Query<AddParams>,
) -> Result<Json<AddResponse>> {
    let response = state.service().handle_add(&params.doc).await?;
    Ok(Json(response))
}
