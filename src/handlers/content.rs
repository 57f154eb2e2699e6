use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::handlers::admin::require_admin;
use crate::services::config_cache::SINGLETON_ID;
use crate::services::store::{Record, StoreError, Table};
use crate::state::AppState;

async fn read_singleton(state: &AppState, table: Table) -> Result<Json<Record>, AppError> {
    match state.store.get(table, SINGLETON_ID).await {
        Ok(record) => Ok(Json(record)),
        Err(StoreError::NotFound) => Ok(Json(Record::new())),
        Err(e) => Err(e.into()),
    }
}

async fn write_singleton(
    state: &AppState,
    headers: &HeaderMap,
    table: Table,
    mut record: Record,
) -> Result<Json<Record>, AppError> {
    require_admin(state, headers)?;

    record.insert("id".to_string(), Value::from(SINGLETON_ID));
    record.insert(
        "updated_at".to_string(),
        Value::from(state.clock.now().to_rfc3339()),
    );
    let saved = state.store.upsert(table, record).await?;
    state.config_cache.invalidate();

    tracing::info!(table = table.as_str(), "settings updated");
    Ok(Json(saved))
}

// GET /api/business-info
pub async fn get_business_info(State(state): State<Arc<AppState>>) -> Result<Json<Record>, AppError> {
    read_singleton(&state, Table::BusinessInfo).await
}

// POST|PUT /api/business-info
pub async fn update_business_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Record>,
) -> Result<Json<Record>, AppError> {
    write_singleton(&state, &headers, Table::BusinessInfo, body).await
}

// GET /api/chatbot-config
pub async fn get_chatbot_config(State(state): State<Arc<AppState>>) -> Result<Json<Record>, AppError> {
    read_singleton(&state, Table::ChatbotConfig).await
}

// POST|PUT /api/chatbot-config
pub async fn update_chatbot_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Record>,
) -> Result<Json<Record>, AppError> {
    write_singleton(&state, &headers, Table::ChatbotConfig, body).await
}
