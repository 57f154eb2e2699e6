use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::handlers::admin::require_admin;
use crate::services::catalog::{Collection, ReorderItem};
use crate::services::store::Record;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    #[serde(default, alias = "items")]
    pub services: Vec<ReorderItem>,
}

/// CRUD routes for one collection under `base`, plus `bulk/reorder`.
pub fn routes(base: &str, collection: Collection) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            base,
            get(move |state: State<Arc<AppState>>, query: Query<ListQuery>| {
                list(state, query, collection)
            })
            .post(move |state: State<Arc<AppState>>, headers: HeaderMap, body: Json<Record>| {
                create(state, headers, body, collection)
            }),
        )
        .route(
            &format!("{base}/:id"),
            get(move |state: State<Arc<AppState>>, id: Path<i64>| show(state, id, collection))
                .put(
                    move |state: State<Arc<AppState>>,
                          headers: HeaderMap,
                          id: Path<i64>,
                          body: Json<Record>| {
                        update(state, headers, id, body, collection)
                    },
                )
                .delete(
                    move |state: State<Arc<AppState>>, headers: HeaderMap, id: Path<i64>| {
                        delete(state, headers, id, collection)
                    },
                ),
        )
        .route(
            &format!("{base}/bulk/reorder"),
            put(
                move |state: State<Arc<AppState>>, headers: HeaderMap, body: Json<ReorderRequest>| {
                    reorder(state, headers, body, collection)
                },
            ),
        )
}

// GET {base}?active=
async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
    collection: Collection,
) -> Result<Json<Vec<Record>>, AppError> {
    // reviews list everything unless asked; the rest show live items only
    let active_only = query
        .active
        .unwrap_or(collection != Collection::Reviews);
    Ok(Json(state.catalog.list(collection, active_only).await?))
}

// GET {base}/:id
async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    collection: Collection,
) -> Result<Json<Record>, AppError> {
    Ok(Json(state.catalog.get(collection, id).await?))
}

// POST {base}
async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Record>,
    collection: Collection,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers)?;
    let saved = state.catalog.create(collection, body).await?;
    Ok(Json(json!({"success": true, "data": saved})))
}

// PUT {base}/:id
async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Record>,
    collection: Collection,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers)?;
    let saved = state.catalog.update(collection, id, body).await?;
    Ok(Json(json!({"success": true, "data": saved})))
}

// DELETE {base}/:id
async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    collection: Collection,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers)?;
    state.catalog.delete(collection, id).await?;
    Ok(Json(json!({"success": true})))
}

// PUT {base}/bulk/reorder
async fn reorder(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ReorderRequest>,
    collection: Collection,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers)?;
    let updated = state.catalog.reorder(collection, &body.services).await?;
    Ok(Json(json!({"success": true, "updated": updated})))
}
