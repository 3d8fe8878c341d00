// src/models/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::procurement::InvoiceStatus;

/// Fatura de venda. Receitas não são rateadas por projeto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440020")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub company_id: Uuid,

    #[schema(example = "FV-2025-0007")]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub date: NaiveDate,

    #[schema(example = "2500.00")]
    pub total_amount: Decimal,

    pub status: InvoiceStatus,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venda com o nome do cliente resolvido (JOIN com companies).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithCompany {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub sale: Sale,

    #[schema(example = "Cliente Beta S.A.")]
    pub company_name: String,
}

// --- Entradas da camada de serviço ---

#[derive(Debug, Clone)]
pub struct NewSale {
    pub company_id: Uuid,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

/// Alterações parciais de uma venda. Campos ausentes preservam o valor atual.
#[derive(Debug, Clone, Default)]
pub struct SaleChanges {
    pub company_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}
