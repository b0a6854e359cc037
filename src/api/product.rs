//! Product endpoints

use crate::api::{parse_id, MessageResponse};
use crate::domain::{CreateProductInput, Product, UpdateProductInput};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Raw price bounds; validated by the service so missing or malformed
/// values come back as field errors rather than extractor rejections
#[derive(Debug, Deserialize)]
pub struct PriceRangeParams {
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
}

/// GET /api/products
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.product_service.list().await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id, "Product")?;
    let product = state.product_service.get(id).await?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> Result<Response> {
    let product = state.product_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<Product>> {
    let id = parse_id(&id, "Product")?;
    let product = state.product_service.update(id, input).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "Product")?;
    state.product_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// GET /api/products/search/query?query=term
pub async fn search(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.product_service.search(&params.query).await?;
    Ok(Json(products))
}

/// GET /api/products/price-range/filter?min_price=..&max_price=..
pub async fn price_range(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PriceRangeParams>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .product_service
        .price_range(params.min_price.as_deref(), params.max_price.as_deref())
        .await?;
    Ok(Json(products))
}

/// GET /api/products/expensive/list
pub async fn most_expensive(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = state.product_service.most_expensive().await?;
    Ok(Json(products))
}

/// GET /api/products/cheap/list
pub async fn cheapest(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = state.product_service.cheapest().await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults_to_empty() {
        let params: SearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(params.query, "");
    }

    #[test]
    fn test_price_range_params_default_to_absent() {
        let params: PriceRangeParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.min_price, None);
        assert_eq!(params.max_price, None);

        let params: PriceRangeParams =
            serde_json::from_str(r#"{"min_price": "5", "max_price": "abc"}"#).unwrap();
        assert_eq!(params.min_price.as_deref(), Some("5"));
        assert_eq!(params.max_price.as_deref(), Some("abc"));
    }
}
