// src/models/payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::procurement::PaymentMethod;

/// Pagamento efetuado contra uma fatura de compra.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440010")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub expense_id: Uuid,

    #[schema(example = "600.00")]
    pub amount: Decimal,

    #[schema(example = "EUR")]
    pub payment_currency_code: Option<String>,

    // Contravalor em moeda local, quando a fatura é em moeda estrangeira.
    #[serde(rename = "amountLCY")]
    #[schema(example = "3300.00")]
    pub amount_lcy: Option<Decimal>,

    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub payment_date: NaiveDate,

    pub payment_method: PaymentMethod,

    #[schema(example = "TED-889123")]
    pub reference_number: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagamento com o número da fatura paga resolvido (JOIN com expenses).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithInvoice {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub payment: Payment,

    #[schema(example = "NF-2025-0042")]
    pub expense_invoice_number: String,
}

// --- Entradas da camada de serviço ---

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub expense_id: Uuid,
    pub amount: Decimal,
    pub payment_currency_code: Option<String>,
    pub amount_lcy: Option<Decimal>,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

/// Alterações parciais de um pagamento. Campos ausentes preservam o valor atual.
#[derive(Debug, Clone, Default)]
pub struct PaymentChanges {
    pub expense_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub payment_currency_code: Option<String>,
    pub amount_lcy: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}
