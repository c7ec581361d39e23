//! Query endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryParams, QueryResponse};

/// POST /query?q=... - answer a question
pub async fn query_rag(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>> {
    tracing::info!("Query: \"{}\"", params.q);

    let answer = state.service().handle_query(&params.q).await?;

    Ok(Json(QueryResponse { answer }))
}
