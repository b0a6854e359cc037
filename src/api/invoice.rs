//! Invoice endpoints

use crate::api::{parse_id, MessageResponse};
use crate::domain::{
    CreateInvoiceInput, Invoice, InvoiceDetail, UpdateInvoiceInput, UpdateStatusInput,
};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// GET /api/invoices
///
/// Plain rows; relations are only loaded by the detail and filter
/// endpoints.
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<Invoice>>> {
    let invoices = state.invoice_service.list().await?;
    Ok(Json(invoices))
}

/// GET /api/invoices/{id}
pub async fn get(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDetail>> {
    let id = parse_id(&id, "Invoice")?;
    let detail = state.invoice_service.get(id).await?;
    Ok(Json(detail))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateInvoiceInput>,
) -> Result<Response> {
    let detail = state.invoice_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

/// PUT /api/invoices/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateInvoiceInput>,
) -> Result<Json<InvoiceDetail>> {
    let id = parse_id(&id, "Invoice")?;
    let detail = state.invoice_service.update(id, input).await?;
    Ok(Json(detail))
}

/// PATCH /api/invoices/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<InvoiceDetail>> {
    let id = parse_id(&id, "Invoice")?;
    let detail = state.invoice_service.set_status(id, input).await?;
    Ok(Json(detail))
}

/// DELETE /api/invoices/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "Invoice")?;
    state.invoice_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Invoice deleted successfully")))
}

/// GET /api/invoices/status/{status}
pub async fn list_by_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<InvoiceDetail>>> {
    let invoices = state.invoice_service.list_by_status(&status).await?;
    Ok(Json(invoices))
}

/// GET /api/invoices/seller/{seller_id}
pub async fn list_by_seller(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> Result<Json<Vec<InvoiceDetail>>> {
    let seller_id = parse_id(&seller_id, "Seller")?;
    let invoices = state.invoice_service.list_by_seller(seller_id).await?;
    Ok(Json(invoices))
}

/// GET /api/invoices/client/{client_id}
pub async fn list_by_client(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<InvoiceDetail>>> {
    let client_id = parse_id(&client_id, "Client")?;
    let invoices = state.invoice_service.list_by_client(client_id).await?;
    Ok(Json(invoices))
}
