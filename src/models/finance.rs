// src/models/finance.rs
//
// Visões derivadas da reconciliação financeira. Nada aqui é persistido:
// os lançamentos são recalculados a cada consulta a partir das faturas,
// pagamentos e vendas.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Visões expostas pela API ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Expense,
    Payment,
    Sale,
}

/// Lançamento unificado do razão por projeto.
/// Convenção de sinal: despesas negativas, pagamentos e vendas positivos.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntry {
    /// Identificador composto: "{faturaId}-{rateioId}" para despesas,
    /// "{pagamentoId}-{rateioId}" para pagamentos e o próprio id para vendas.
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000-550e8400-e29b-41d4-a716-446655440001")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub date: NaiveDate,

    #[schema(example = "-600.00")]
    pub amount: Decimal,

    #[schema(example = "Fatura NF-2025-0042 - ACME Serviços Ltda")]
    pub description: String,

    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,

    pub company_name: Option<String>,
    pub invoice_number: Option<String>,
    pub reference_number: Option<String>,
}

/// Totais agregados de um projeto (ou do balde sem projeto, no caso
/// das vendas). net_amount considera vendas e despesas; pagamentos são
/// fluxo de caixa e ficam fora do resultado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFinancialSummary {
    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,

    #[schema(example = "600.00")]
    pub total_expenses: Decimal,

    #[schema(example = "600.00")]
    pub total_payments: Decimal,

    #[schema(example = "0.00")]
    pub total_sales: Decimal,

    #[schema(example = "-600.00")]
    pub net_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntriesReport {
    pub entries: Vec<FinancialEntry>,
    pub summary: Vec<ProjectFinancialSummary>,
}

// --- Linhas cruas lidas do banco pelo motor de reconciliação ---

#[derive(Debug, Clone, FromRow)]
pub struct AllocatedExpenseRow {
    pub expense_id: Uuid,
    pub allocation_id: Uuid,
    pub project_id: Uuid,
    pub project_name: String,
    pub company_name: String,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub allocated_amount: Option<Decimal>,
    pub allocated_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentAllocationRow {
    pub payment_id: Uuid,
    pub allocation_id: Uuid,
    pub project_id: Uuid,
    pub project_name: String,
    pub company_name: String,
    pub invoice_number: String,
    pub reference_number: Option<String>,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub expense_total: Decimal,
    pub allocated_amount: Option<Decimal>,
    pub allocated_percentage: Option<Decimal>,
}
