// src/handlers/procurements.rs

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

// Importa os nossos extratores e erros
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceRead, PermFinanceWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::procurement::{ExpenseChanges, InvoiceStatus, NewExpense, PaymentMethod},
    services::allocation::AllocationRequest,
};

// ---
// 1. "Payloads" (O "Formulário" da API)
// ---

/// Um rateio do formulário: ou valor fixo ou percentual, nunca ambos.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPayload {
    pub project_id: Uuid,

    #[schema(example = "600.00")]
    pub allocated_amount: Option<Decimal>,

    #[schema(example = "60.0")]
    pub allocated_percentage: Option<Decimal>,
}

impl AllocationPayload {
    fn into_request(self) -> Result<AllocationRequest, AppError> {
        AllocationRequest::from_parts(
            self.project_id,
            self.allocated_amount,
            self.allocated_percentage,
        )
    }
}

fn into_requests(payloads: Vec<AllocationPayload>) -> Result<Vec<AllocationRequest>, AppError> {
    payloads
        .into_iter()
        .map(AllocationPayload::into_request)
        .collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    pub company_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    pub invoice_number: String,

    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub ref_start_date: Option<NaiveDate>,
    pub ref_end_date: Option<NaiveDate>,

    #[validate(length(equal = 3, message = "invalid_currency_code"))]
    pub invoice_currency_code: Option<String>,

    #[schema(example = "1000.00")]
    pub total_amount: Decimal,

    pub payment_method: PaymentMethod,

    /// Omitido, a fatura nasce "pending".
    pub status: Option<InvoiceStatus>,

    pub notes: Option<String>,
    pub document_url: Option<String>,

    pub allocations: Vec<AllocationPayload>,
}

impl CreateExpensePayload {
    fn fields(&self) -> NewExpense {
        NewExpense {
            company_id: self.company_id,
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            due_date: self.due_date,
            ref_start_date: self.ref_start_date,
            ref_end_date: self.ref_end_date,
            invoice_currency_code: self.invoice_currency_code.clone(),
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            status: self.status.unwrap_or(InvoiceStatus::Pending),
            notes: self.notes.clone(),
            document_url: self.document_url.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpensePayload {
    pub company_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub invoice_number: Option<String>,

    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub ref_start_date: Option<NaiveDate>,
    pub ref_end_date: Option<NaiveDate>,

    #[validate(length(equal = 3, message = "invalid_currency_code"))]
    pub invoice_currency_code: Option<String>,

    pub total_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub document_url: Option<String>,

    /// Presente, substitui o conjunto inteiro de rateios; ausente,
    /// os rateios atuais ficam como estão.
    pub allocations: Option<Vec<AllocationPayload>>,
}

impl UpdateExpensePayload {
    fn changes(&self) -> ExpenseChanges {
        ExpenseChanges {
            company_id: self.company_id,
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            due_date: self.due_date,
            ref_start_date: self.ref_start_date,
            ref_end_date: self.ref_end_date,
            invoice_currency_code: self.invoice_currency_code.clone(),
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            status: self.status,
            notes: self.notes.clone(),
            document_url: self.document_url.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProcurementsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub project_id: Option<Uuid>,
}

// ---
// 2. Os "Handlers" (As Rotas)
// ---

#[utoipa::path(
    post,
    path = "/api/procurements",
    tag = "Procurements",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Fatura criada com seus rateios", body = crate::models::procurement::ExpenseDetail),
        (status = 400, description = "Rateios inválidos (soma, repetição ou regra XOR)"),
        (status = 404, description = "Empresa ou projeto inexistente no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_procurement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fields = payload.fields();
    let allocations = into_requests(payload.allocations)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .procurement_service
        .create_expense(tenant.0, fields, allocations)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/procurements",
    tag = "Procurements",
    params(
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("pageSize" = Option<i64>, Query, description = "Itens por página (máx. 100)"),
        ("search" = Option<String>, Query, description = "Busca por número, notas ou empresa"),
        ("projectId" = Option<Uuid>, Query, description = "Só faturas com rateio neste projeto")
    ),
    responses(
        (status = 200, description = "Página de faturas com rateios", body = crate::common::pagination::Paginated<crate::models::procurement::ExpenseDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_procurements(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<ListProcurementsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .procurement_service
        .list_expenses(
            tenant.0,
            query.page,
            query.page_size,
            query.search.as_deref(),
            query.project_id,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    get,
    path = "/api/procurements/{id}",
    tag = "Procurements",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura com rateios", body = crate::models::procurement::ExpenseDetail),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_procurement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .procurement_service
        .get_expense(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/procurements/{id}",
    tag = "Procurements",
    request_body = UpdateExpensePayload,
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura atualizada", body = crate::models::procurement::ExpenseDetail),
        (status = 400, description = "Rateios inválidos contra o total vigente"),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_procurement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let changes = payload.changes();
    let allocations = match payload.allocations {
        Some(allocs) => Some(
            into_requests(allocs).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        ),
        None => None,
    };

    let detail = app_state
        .procurement_service
        .update_expense(tenant.0, id, changes, allocations)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/procurements/{id}",
    tag = "Procurements",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 204, description = "Fatura removida"),
        (status = 404, description = "Fatura não encontrada"),
        (status = 409, description = "Fatura possui pagamentos vinculados")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_procurement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .procurement_service
        .delete_expense(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_de_criacao_aceita_o_contrato_camel_case() {
        let payload: CreateExpensePayload = serde_json::from_value(json!({
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "invoiceNumber": "NF-001",
            "date": "2025-03-10",
            "totalAmount": 1000.0,
            "paymentMethod": "bank-transfer",
            "allocations": [
                { "projectId": "550e8400-e29b-41d4-a716-446655440001", "allocatedPercentage": 60.0 },
                { "projectId": "550e8400-e29b-41d4-a716-446655440002", "allocatedAmount": 400.0 }
            ]
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.allocations.len(), 2);
        assert_eq!(payload.fields().status, InvoiceStatus::Pending);
    }

    #[test]
    fn numero_de_fatura_vazio_reprova_na_validacao() {
        let payload: CreateExpensePayload = serde_json::from_value(json!({
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "invoiceNumber": "",
            "date": "2025-03-10",
            "totalAmount": 1000.0,
            "paymentMethod": "other",
            "allocations": []
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn codigo_de_moeda_precisa_de_tres_letras() {
        let payload: CreateExpensePayload = serde_json::from_value(json!({
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "invoiceNumber": "NF-001",
            "date": "2025-03-10",
            "invoiceCurrencyCode": "EURO",
            "totalAmount": 1000.0,
            "paymentMethod": "paypal",
            "allocations": []
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn rateio_com_ambos_os_valores_reprova_na_conversao() {
        let payload: AllocationPayload = serde_json::from_value(json!({
            "projectId": "550e8400-e29b-41d4-a716-446655440001",
            "allocatedAmount": 600.0,
            "allocatedPercentage": 60.0
        }))
        .unwrap();

        assert!(matches!(
            payload.into_request(),
            Err(AppError::AllocationValueRequired)
        ));
    }
}
