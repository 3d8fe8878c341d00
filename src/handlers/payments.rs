// src/handlers/payments.rs

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
    models::payment::{NewPayment, PaymentChanges},
    models::procurement::PaymentMethod,
};

// ---
// 1. "Payloads" (O "Formulário" da API)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    pub expense_id: Uuid,

    #[schema(example = "350.00")]
    pub amount: Decimal,

    #[validate(length(equal = 3, message = "invalid_currency_code"))]
    pub payment_currency_code: Option<String>,

    #[serde(rename = "amountLCY")]
    pub amount_lcy: Option<Decimal>,

    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl CreatePaymentPayload {
    fn fields(&self) -> NewPayment {
        NewPayment {
            expense_id: self.expense_id,
            amount: self.amount,
            payment_currency_code: self.payment_currency_code.clone(),
            amount_lcy: self.amount_lcy,
            payment_date: self.payment_date,
            payment_method: self.payment_method,
            reference_number: self.reference_number.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    pub expense_id: Option<Uuid>,
    pub amount: Option<Decimal>,

    #[validate(length(equal = 3, message = "invalid_currency_code"))]
    pub payment_currency_code: Option<String>,

    #[serde(rename = "amountLCY")]
    pub amount_lcy: Option<Decimal>,

    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl UpdatePaymentPayload {
    fn changes(&self) -> PaymentChanges {
        PaymentChanges {
            expense_id: self.expense_id,
            amount: self.amount,
            payment_currency_code: self.payment_currency_code.clone(),
            amount_lcy: self.amount_lcy,
            payment_date: self.payment_date,
            payment_method: self.payment_method,
            reference_number: self.reference_number.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ---
// 2. Os "Handlers" (As Rotas)
// ---

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = crate::models::payment::PaymentWithInvoice),
        (status = 400, description = "Valor não positivo"),
        (status = 404, description = "Fatura inexistente no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<CreatePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .create_payment(tenant.0, payload.fields())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("pageSize" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Página de pagamentos com a fatura de origem", body = crate::common::pagination::Paginated<crate::models::payment::PaymentWithInvoice>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .payment_service
        .list_payments(tenant.0, query.page, query.page_size)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    tag = "Payments",
    request_body = UpdatePaymentPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento atualizado", body = crate::models::payment::PaymentWithInvoice),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .update_payment(tenant.0, id, payload.changes())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento removido"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .delete_payment(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_de_pagamento_aceita_o_contrato_camel_case() {
        let payload: CreatePaymentPayload = serde_json::from_value(json!({
            "expenseId": "550e8400-e29b-41d4-a716-446655440000",
            "amount": 350.0,
            "paymentCurrencyCode": "EUR",
            "amountLCY": 362.5,
            "paymentDate": "2025-04-02",
            "paymentMethod": "corporate-card",
            "referenceNumber": "TRX-778"
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        let fields = payload.fields();
        assert_eq!(fields.amount_lcy, Some(Decimal::new(3625, 1)));
        assert_eq!(fields.payment_method, PaymentMethod::CorporateCard);
    }

    #[test]
    fn moeda_do_pagamento_precisa_de_tres_letras() {
        let payload: UpdatePaymentPayload = serde_json::from_value(json!({
            "paymentCurrencyCode": "EU"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }
}
