// src/models/procurement.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CorporateCard, // Cartão corporativo
    BankTransfer,  // Transferência
    Paypal,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStatus {
    Pending,       // Em aberto
    PartiallyPaid, // Pago parcialmente
    Paid,          // Quitado
}

// --- Structs ---

/// Fatura de compra, sempre rateada entre um ou mais projetos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub company_id: Uuid,

    #[schema(example = "NF-2025-0042")]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date, example = "2025-04-10")]
    pub due_date: Option<NaiveDate>,

    // Período de referência coberto pela fatura (ex.: mensalidade).
    #[schema(value_type = Option<String>, format = Date)]
    pub ref_start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ref_end_date: Option<NaiveDate>,

    #[schema(example = "EUR")]
    pub invoice_currency_code: Option<String>,

    #[schema(example = "1000.00")]
    pub total_amount: Decimal,

    pub payment_method: PaymentMethod,
    pub status: InvoiceStatus,

    pub notes: Option<String>,

    #[schema(example = "https://files.example.com/invoices/nf-2025-0042.pdf")]
    pub document_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fatura com o nome do fornecedor resolvido (JOIN com companies).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithCompany {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub expense: Expense,

    #[schema(example = "ACME Serviços Ltda")]
    pub company_name: String,
}

/// Linha de rateio com o nome do projeto resolvido, pronta para resposta.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDetail {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub project_id: Uuid,

    #[schema(example = "Projeto Alfa")]
    pub project_name: String,

    #[schema(example = "600.00")]
    pub allocated_amount: Option<Decimal>,

    #[schema(example = "60.0")]
    pub allocated_percentage: Option<Decimal>,
}

/// Resposta completa de fatura: campos próprios, fornecedor e rateios.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: Expense,

    #[schema(example = "ACME Serviços Ltda")]
    pub company_name: String,

    pub allocations: Vec<AllocationDetail>,
}

// --- Entradas da camada de serviço ---

/// Campos de uma fatura nova, já normalizados pelo handler.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub company_id: Uuid,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub ref_start_date: Option<NaiveDate>,
    pub ref_end_date: Option<NaiveDate>,
    pub invoice_currency_code: Option<String>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub document_url: Option<String>,
}

/// Alterações parciais de uma fatura. Campos ausentes preservam o valor atual.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub company_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub ref_start_date: Option<NaiveDate>,
    pub ref_end_date: Option<NaiveDate>,
    pub invoice_currency_code: Option<String>,
    pub total_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub document_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_serializam_em_kebab_case() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::CorporateCard).unwrap(),
            json!("corporate-card")
        );
        assert_eq!(
            serde_json::to_value(InvoiceStatus::PartiallyPaid).unwrap(),
            json!("partially-paid")
        );
    }

    #[test]
    fn enums_desserializam_do_contrato_json() {
        let method: PaymentMethod = serde_json::from_value(json!("bank-transfer")).unwrap();
        assert_eq!(method, PaymentMethod::BankTransfer);

        let status: InvoiceStatus = serde_json::from_value(json!("paid")).unwrap();
        assert_eq!(status, InvoiceStatus::Paid);
    }
}
