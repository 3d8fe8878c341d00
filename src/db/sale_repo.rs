// src/db/sale_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{NewSale, Sale, SaleChanges, SaleWithCompany},
};

const SALE_COLUMNS: &str =
    "id, tenant_id, company_id, invoice_number, date, total_amount, status, notes, \
     created_at, updated_at";

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tenant_id: Uuid, fields: &NewSale) -> Result<Sale, AppError> {
        let sql = format!(
            r#"
            INSERT INTO sales (tenant_id, company_id, invoice_number, date, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SALE_COLUMNS}
            "#
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(tenant_id)
            .bind(fields.company_id)
            .bind(&fields.invoice_number)
            .bind(fields.date)
            .bind(fields.total_amount)
            .bind(fields.status)
            .bind(fields.notes.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Atualização parcial via COALESCE: campo nulo preserva o valor atual.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        changes: &SaleChanges,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sales SET
                company_id = COALESCE($3, company_id),
                invoice_number = COALESCE($4, invoice_number),
                date = COALESCE($5, date),
                total_amount = COALESCE($6, total_amount),
                status = COALESCE($7, status),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(changes.company_id)
        .bind(changes.invoice_number.as_deref())
        .bind(changes.date)
        .bind(changes.total_amount)
        .bind(changes.status)
        .bind(changes.notes.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, tenant_id: Uuid, sale_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND tenant_id = $2")
            .bind(sale_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_with_company(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<SaleWithCompany>, AppError> {
        let sale = sqlx::query_as::<_, SaleWithCompany>(
            r#"
            SELECT s.*, c.name AS company_name
            FROM sales s
            JOIN companies c ON c.id = s.company_id
            WHERE s.tenant_id = $1 AND s.id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    pub async fn list_with_company(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SaleWithCompany>, AppError> {
        let sales = sqlx::query_as::<_, SaleWithCompany>(
            r#"
            SELECT s.*, c.name AS company_name
            FROM sales s
            JOIN companies c ON c.id = s.company_id
            WHERE s.tenant_id = $1
            ORDER BY s.date DESC, s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn count(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
