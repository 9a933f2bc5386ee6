//! Catalog HTTP routes.
//!
//! Endpoints:
//! - `GET    /products`                          — full catalog
//! - `GET    /products/{id}`                     — one product, or 404
//! - `GET    /products/search?priceGt=<number>`  — products priced strictly above a threshold
//! - `GET    /products/consumer_price?list=<ids>`— checkout quote; reserves stock (token required)
//! - `POST   /products`                          — create (token required)
//! - `PUT    /products/{id}`                     — upsert/replace (token required)
//! - `PATCH  /products/{id}`                     — partial merge (token required)
//! - `DELETE /products/{id}`                     — delete (token required)
//!
//! The quote endpoint is a GET for compatibility with existing clients but
//! decrements stock, so it sits behind the same token as the mutations.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use stockroom_core::domain::product::{Product, ProductDraft, ProductId};
use stockroom_core::domain::update::parse_patch;
use stockroom_core::pricing::PriceQuote;
use stockroom_store::ProductCatalog;

use crate::auth::require_admin_token;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ProductCatalog>,
    pub admin_token: SecretString,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/consumer_price", get(consumer_price))
        .route(
            "/products/{id}",
            get(get_product).put(replace_product).patch(patch_product).delete(delete_product),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "priceGt")]
    price_gt: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ConsumerPriceParams {
    list: Option<String>,
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.get_all().await)
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get_by_id(ProductId(id)).await?;
    Ok(Json(product))
}

async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Product>> {
    Json(state.catalog.find_by_price_greater_than(params.price_gt).await)
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_admin_token(&headers, &state.admin_token)?;

    let correlation_id = Uuid::new_v4();
    let created = state.catalog.create(draft).await?;
    info!(
        event_name = "catalog.product_created",
        correlation_id = %correlation_id,
        product_id = %created.id,
        code_value = %created.code_value,
        "product created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    require_admin_token(&headers, &state.admin_token)?;

    let correlation_id = Uuid::new_v4();
    let stored = state.catalog.replace(ProductId(id), draft).await?;
    info!(
        event_name = "catalog.product_replaced",
        correlation_id = %correlation_id,
        requested_id = id,
        product_id = %stored.id,
        "product upserted"
    );

    Ok(Json(stored))
}

async fn patch_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Product>, ApiError> {
    require_admin_token(&headers, &state.admin_token)?;

    let updates = parse_patch(&body)?;
    let correlation_id = Uuid::new_v4();
    let merged = state.catalog.merge_partial(ProductId(id), updates).await?;
    info!(
        event_name = "catalog.product_patched",
        correlation_id = %correlation_id,
        product_id = %merged.id,
        "product partially updated"
    );

    Ok(Json(merged))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin_token(&headers, &state.admin_token)?;

    let correlation_id = Uuid::new_v4();
    state.catalog.delete(ProductId(id)).await?;
    info!(
        event_name = "catalog.product_deleted",
        correlation_id = %correlation_id,
        product_id = id,
        "product deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

async fn consumer_price(
    State(state): State<AppState>,
    Query(params): Query<ConsumerPriceParams>,
    headers: HeaderMap,
) -> Result<Json<PriceQuote>, ApiError> {
    require_admin_token(&headers, &state.admin_token)?;

    let ids = parse_basket(params.list.as_deref())?;
    let correlation_id = Uuid::new_v4();
    let quote = state.catalog.consumer_price(&ids).await?;
    info!(
        event_name = "catalog.consumer_price_quoted",
        correlation_id = %correlation_id,
        items = quote.items,
        "consumer price quoted"
    );

    Ok(Json(quote))
}

/// An absent or empty `list` parameter means "quote the whole catalog".
fn parse_basket(raw: Option<&str>) -> Result<Vec<ProductId>, ApiError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let ids: Vec<i64> = serde_json::from_str(raw)
        .map_err(|_| ApiError::BadRequest("invalid basket list".to_string()))?;

    Ok(ids.into_iter().map(ProductId).collect())
}
