// src/db/finance_repo.rs
//
// Leituras do motor de reconciliação. Três consultas, uma por fonte de
// lançamento; o cálculo em si acontece no serviço, sobre as linhas cruas.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{AllocatedExpenseRow, PaymentAllocationRow},
    models::sale::SaleWithCompany,
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Uma linha por rateio de fatura. O JOIN com expense_allocations já
    /// descarta faturas sem rateio; com filtro de projeto, só os rateios
    /// daquele projeto entram.
    pub async fn allocated_expense_rows(
        &self,
        tenant_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<AllocatedExpenseRow>, AppError> {
        let rows = sqlx::query_as::<_, AllocatedExpenseRow>(
            r#"
            SELECT e.id AS expense_id, a.id AS allocation_id, a.project_id,
                   p.name AS project_name, c.name AS company_name,
                   e.invoice_number, e.date, e.total_amount,
                   a.allocated_amount, a.allocated_percentage
            FROM expenses e
            JOIN expense_allocations a ON a.expense_id = e.id
            JOIN projects p ON p.id = a.project_id
            JOIN companies c ON c.id = e.company_id
            WHERE e.tenant_id = $1
              AND ($2::uuid IS NULL OR a.project_id = $2)
            ORDER BY e.date DESC
            "#,
        )
        .bind(tenant_id)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Uma linha por par pagamento x rateio da fatura paga. Pagamentos de
    /// faturas sem rateio ficam de fora (não há projeto a quem atribuir).
    pub async fn payment_allocation_rows(
        &self,
        tenant_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<PaymentAllocationRow>, AppError> {
        let rows = sqlx::query_as::<_, PaymentAllocationRow>(
            r#"
            SELECT pay.id AS payment_id, a.id AS allocation_id, a.project_id,
                   p.name AS project_name, c.name AS company_name,
                   e.invoice_number, pay.reference_number, pay.payment_date,
                   pay.amount, e.total_amount AS expense_total,
                   a.allocated_amount, a.allocated_percentage
            FROM payments pay
            JOIN expenses e ON e.id = pay.expense_id
            JOIN expense_allocations a ON a.expense_id = e.id
            JOIN projects p ON p.id = a.project_id
            JOIN companies c ON c.id = e.company_id
            WHERE pay.tenant_id = $1
              AND ($2::uuid IS NULL OR a.project_id = $2)
            ORDER BY pay.payment_date DESC
            "#,
        )
        .bind(tenant_id)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Vendas com o nome do cliente. Entram no razão apenas na visão sem
    /// filtro de projeto, porque venda não tem rateio.
    pub async fn sale_rows(&self, tenant_id: Uuid) -> Result<Vec<SaleWithCompany>, AppError> {
        let rows = sqlx::query_as::<_, SaleWithCompany>(
            r#"
            SELECT s.*, c.name AS company_name
            FROM sales s
            JOIN companies c ON c.id = s.company_id
            WHERE s.tenant_id = $1
            ORDER BY s.date DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
