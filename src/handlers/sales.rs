// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceRead, PermFinanceWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::procurement::InvoiceStatus,
    models::sale::{NewSale, SaleChanges},
};

// ---
// 1. "Payloads" (O "Formulário" da API)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub company_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    pub invoice_number: String,

    pub date: NaiveDate,

    #[schema(example = "2500.00")]
    pub total_amount: Decimal,

    /// Omitido, a venda nasce "pending".
    pub status: Option<InvoiceStatus>,

    pub notes: Option<String>,
}

impl CreateSalePayload {
    fn fields(&self) -> NewSale {
        NewSale {
            company_id: self.company_id,
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            total_amount: self.total_amount,
            status: self.status.unwrap_or(InvoiceStatus::Pending),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub company_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub invoice_number: Option<String>,

    pub date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

impl UpdateSalePayload {
    fn changes(&self) -> SaleChanges {
        SaleChanges {
            company_id: self.company_id,
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            total_amount: self.total_amount,
            status: self.status,
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ---
// 2. Os "Handlers" (As Rotas)
// ---

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda criada", body = crate::models::sale::SaleWithCompany),
        (status = 400, description = "Valor não positivo"),
        (status = 404, description = "Cliente inexistente no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .sale_service
        .create_sale(tenant.0, payload.fields())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("pageSize" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Página de vendas com o nome do cliente", body = crate::common::pagination::Paginated<crate::models::sale::SaleWithCompany>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<ListSalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .sale_service
        .list_sales(tenant.0, query.page, query.page_size)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda com o nome do cliente", body = crate::models::sale::SaleWithCompany),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sale_service
        .get_sale(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = UpdateSalePayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda atualizada", body = crate::models::sale::SaleWithCompany),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .sale_service
        .update_sale(tenant.0, id, payload.changes())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda removida"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .sale_service
        .delete_sale(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_de_venda_assume_status_pendente() {
        let payload: CreateSalePayload = serde_json::from_value(json!({
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "invoiceNumber": "FV-2025-0007",
            "date": "2025-03-20",
            "totalAmount": 2500.0
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.fields().status, InvoiceStatus::Pending);
    }

    #[test]
    fn status_explicito_e_preservado() {
        let payload: CreateSalePayload = serde_json::from_value(json!({
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "invoiceNumber": "FV-2025-0008",
            "date": "2025-03-21",
            "totalAmount": 800.0,
            "status": "paid"
        }))
        .unwrap();

        assert_eq!(payload.fields().status, InvoiceStatus::Paid);
    }
}
