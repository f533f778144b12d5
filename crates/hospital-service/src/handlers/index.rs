use crate::errors::HospitalError;
use crate::models::IndexInfo;
use crate::routes::AppState;
use crate::services::catalog_service;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Handler for GET /api/index (admin dashboard).
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Json<IndexInfo>, HospitalError> {
    Ok(Json(catalog_service::index_info(&state.stores).await?))
}
