// src/db/payment_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{NewPayment, Payment, PaymentChanges, PaymentWithInvoice},
};

const PAYMENT_COLUMNS: &str = "id, tenant_id, expense_id, amount, payment_currency_code, \
     amount_lcy, payment_date, payment_method, reference_number, notes, created_at, updated_at";

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        tenant_id: Uuid,
        fields: &NewPayment,
    ) -> Result<Payment, AppError> {
        let sql = format!(
            r#"
            INSERT INTO payments (
                tenant_id, expense_id, amount, payment_currency_code,
                amount_lcy, payment_date, payment_method, reference_number, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(tenant_id)
            .bind(fields.expense_id)
            .bind(fields.amount)
            .bind(fields.payment_currency_code.as_deref())
            .bind(fields.amount_lcy)
            .bind(fields.payment_date)
            .bind(fields.payment_method)
            .bind(fields.reference_number.as_deref())
            .bind(fields.notes.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Atualização parcial via COALESCE: campo nulo preserva o valor atual.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        changes: &PaymentChanges,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                expense_id = COALESCE($3, expense_id),
                amount = COALESCE($4, amount),
                payment_currency_code = COALESCE($5, payment_currency_code),
                amount_lcy = COALESCE($6, amount_lcy),
                payment_date = COALESCE($7, payment_date),
                payment_method = COALESCE($8, payment_method),
                reference_number = COALESCE($9, reference_number),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(payment_id)
        .bind(tenant_id)
        .bind(changes.expense_id)
        .bind(changes.amount)
        .bind(changes.payment_currency_code.as_deref())
        .bind(changes.amount_lcy)
        .bind(changes.payment_date)
        .bind(changes.payment_method)
        .bind(changes.reference_number.as_deref())
        .bind(changes.notes.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, tenant_id: Uuid, payment_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND tenant_id = $2")
            .bind(payment_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_with_invoice(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
    ) -> Result<Option<PaymentWithInvoice>, AppError> {
        let payment = sqlx::query_as::<_, PaymentWithInvoice>(
            r#"
            SELECT p.*, e.invoice_number AS expense_invoice_number
            FROM payments p
            JOIN expenses e ON e.id = p.expense_id
            WHERE p.tenant_id = $1 AND p.id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn list_with_invoice(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaymentWithInvoice>, AppError> {
        let payments = sqlx::query_as::<_, PaymentWithInvoice>(
            r#"
            SELECT p.*, e.invoice_number AS expense_invoice_number
            FROM payments p
            JOIN expenses e ON e.id = p.expense_id
            WHERE p.tenant_id = $1
            ORDER BY p.payment_date DESC, p.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    pub async fn count(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payments WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    /// Quantos pagamentos apontam para a fatura. Usado pela trava de
    /// exclusão de faturas.
    pub async fn count_by_expense(
        &self,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM payments WHERE tenant_id = $1 AND expense_id = $2",
        )
        .bind(tenant_id)
        .bind(expense_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
