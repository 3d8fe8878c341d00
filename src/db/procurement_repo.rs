// src/db/procurement_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::procurement::{
        AllocationDetail, Expense, ExpenseChanges, ExpenseWithCompany, NewExpense,
    },
    services::allocation::NormalizedAllocation,
};

const EXPENSE_COLUMNS: &str = "id, tenant_id, company_id, invoice_number, date, due_date, \
     ref_start_date, ref_end_date, invoice_currency_code, total_amount, payment_method, \
     status, notes, document_url, created_at, updated_at";

#[derive(Clone)]
pub struct ProcurementRepository {
    pool: PgPool,
}

impl ProcurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FATURAS
    // =========================================================================

    /// Insere a fatura e devolve a linha completa.
    /// Recebe um executor para poder rodar dentro da transação que também
    /// grava os rateios.
    pub async fn insert_expense<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        fields: &NewExpense,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO expenses (
                tenant_id, company_id, invoice_number, date, due_date,
                ref_start_date, ref_end_date, invoice_currency_code,
                total_amount, payment_method, status, notes, document_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {EXPENSE_COLUMNS}
            "#
        );

        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(tenant_id)
            .bind(fields.company_id)
            .bind(&fields.invoice_number)
            .bind(fields.date)
            .bind(fields.due_date)
            .bind(fields.ref_start_date)
            .bind(fields.ref_end_date)
            .bind(fields.invoice_currency_code.as_deref())
            .bind(fields.total_amount)
            .bind(fields.payment_method)
            .bind(fields.status)
            .bind(fields.notes.as_deref())
            .bind(fields.document_url.as_deref())
            .fetch_one(executor)
            .await?;

        Ok(expense)
    }

    /// Atualização parcial via COALESCE: campo nulo preserva o valor atual.
    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        expense_id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                company_id = COALESCE($3, company_id),
                invoice_number = COALESCE($4, invoice_number),
                date = COALESCE($5, date),
                due_date = COALESCE($6, due_date),
                ref_start_date = COALESCE($7, ref_start_date),
                ref_end_date = COALESCE($8, ref_end_date),
                invoice_currency_code = COALESCE($9, invoice_currency_code),
                total_amount = COALESCE($10, total_amount),
                payment_method = COALESCE($11, payment_method),
                status = COALESCE($12, status),
                notes = COALESCE($13, notes),
                document_url = COALESCE($14, document_url),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(expense_id)
        .bind(tenant_id)
        .bind(changes.company_id)
        .bind(changes.invoice_number.as_deref())
        .bind(changes.date)
        .bind(changes.due_date)
        .bind(changes.ref_start_date)
        .bind(changes.ref_end_date)
        .bind(changes.invoice_currency_code.as_deref())
        .bind(changes.total_amount)
        .bind(changes.payment_method)
        .bind(changes.status)
        .bind(changes.notes.as_deref())
        .bind(changes.document_url.as_deref())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ExpenseNotFound);
        }
        Ok(())
    }

    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<Option<Expense>, AppError> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE tenant_id = $1 AND id = $2");
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(tenant_id)
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    /// Busca a fatura com o nome do fornecedor. Executor genérico porque a
    /// montagem da resposta acontece dentro da mesma transação da escrita.
    pub async fn find_with_company<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<Option<ExpenseWithCompany>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, ExpenseWithCompany>(
            r#"
            SELECT e.*, c.name AS company_name
            FROM expenses e
            JOIN companies c ON c.id = e.company_id
            WHERE e.tenant_id = $1 AND e.id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(expense_id)
        .fetch_optional(executor)
        .await?;

        Ok(expense)
    }

    /// Listagem paginada. O termo de busca cobre número da fatura, notas e
    /// nome do fornecedor; o filtro de projeto exige pelo menos um rateio
    /// para o projeto pedido.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        search: Option<&str>,
        project_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExpenseWithCompany>, AppError> {
        let pattern = search.map(|term| format!("%{term}%"));

        let expenses = sqlx::query_as::<_, ExpenseWithCompany>(
            r#"
            SELECT e.*, c.name AS company_name
            FROM expenses e
            JOIN companies c ON c.id = e.company_id
            WHERE e.tenant_id = $1
              AND ($2::text IS NULL OR e.invoice_number ILIKE $2 OR e.notes ILIKE $2 OR c.name ILIKE $2)
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM expense_allocations a
                    WHERE a.expense_id = e.id AND a.project_id = $3
              ))
            ORDER BY e.date DESC, e.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(pattern.as_deref())
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn count(
        &self,
        tenant_id: Uuid,
        search: Option<&str>,
        project_id: Option<Uuid>,
    ) -> Result<i64, AppError> {
        let pattern = search.map(|term| format!("%{term}%"));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM expenses e
            JOIN companies c ON c.id = e.company_id
            WHERE e.tenant_id = $1
              AND ($2::text IS NULL OR e.invoice_number ILIKE $2 OR e.notes ILIKE $2 OR c.name ILIKE $2)
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM expense_allocations a
                    WHERE a.expense_id = e.id AND a.project_id = $3
              ))
            "#,
        )
        .bind(tenant_id)
        .bind(pattern.as_deref())
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Apaga a fatura apenas se continuar sem pagamentos no instante do
    /// DELETE. O serviço confere antes; esta cláusula fecha a janela entre
    /// a conferência e a remoção. Os rateios caem junto pelo ON DELETE CASCADE.
    pub async fn delete_if_unpaid(
        &self,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM expenses
            WHERE id = $1 AND tenant_id = $2
              AND NOT EXISTS (SELECT 1 FROM payments p WHERE p.expense_id = $1)
            "#,
        )
        .bind(expense_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  RATEIOS
    // =========================================================================

    /// Grava um rateio já normalizado. O UNIQUE (expense_id, project_id) é a
    /// segunda barreira contra projeto repetido; o motor de rateio é a primeira.
    pub async fn insert_allocation<'e, E>(
        &self,
        executor: E,
        expense_id: Uuid,
        allocation: &NormalizedAllocation,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO expense_allocations (expense_id, project_id, allocated_amount, allocated_percentage)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(expense_id)
        .bind(allocation.project_id)
        .bind(allocation.amount)
        .bind(allocation.percentage)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::AllocationDuplicateProject;
                }
            }
            e.into()
        })?;

        Ok(())
    }

    pub async fn delete_allocations<'e, E>(
        &self,
        executor: E,
        expense_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM expense_allocations WHERE expense_id = $1")
            .bind(expense_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Rateios de uma fatura com o nome do projeto resolvido, opcionalmente
    /// restritos a um projeto.
    pub async fn allocation_details<'e, E>(
        &self,
        executor: E,
        expense_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<AllocationDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let allocations = sqlx::query_as::<_, AllocationDetail>(
            r#"
            SELECT a.id, a.expense_id, a.project_id, p.name AS project_name,
                   a.allocated_amount, a.allocated_percentage
            FROM expense_allocations a
            JOIN projects p ON p.id = a.project_id
            WHERE a.expense_id = $1
              AND ($2::uuid IS NULL OR a.project_id = $2)
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(expense_id)
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(allocations)
    }

    /// Rateios de um lote de faturas numa ida só, para montar listagens
    /// sem uma consulta por linha.
    pub async fn allocation_details_for_expenses(
        &self,
        expense_ids: &[Uuid],
        project_id: Option<Uuid>,
    ) -> Result<Vec<AllocationDetail>, AppError> {
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }

        let allocations = sqlx::query_as::<_, AllocationDetail>(
            r#"
            SELECT a.id, a.expense_id, a.project_id, p.name AS project_name,
                   a.allocated_amount, a.allocated_percentage
            FROM expense_allocations a
            JOIN projects p ON p.id = a.project_id
            WHERE a.expense_id = ANY($1)
              AND ($2::uuid IS NULL OR a.project_id = $2)
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(expense_ids)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(allocations)
    }
}
