// src/services/procurement_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{self, Paginated},
    db::{DirectoryRepository, PaymentRepository, ProcurementRepository},
    models::procurement::{AllocationDetail, ExpenseChanges, ExpenseDetail, NewExpense},
    services::allocation::{self, AllocationRequest},
};
use std::collections::HashMap;

/// Orquestra o ciclo de vida das faturas de compra. Toda escrita que
/// envolve fatura e rateios acontece numa transação só: ou entra tudo,
/// ou não entra nada.
#[derive(Clone)]
pub struct ProcurementService {
    repo: ProcurementRepository,
    directory_repo: DirectoryRepository,
    payment_repo: PaymentRepository,
    pool: PgPool,
}

impl ProcurementService {
    pub fn new(
        repo: ProcurementRepository,
        directory_repo: DirectoryRepository,
        payment_repo: PaymentRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            directory_repo,
            payment_repo,
            pool,
        }
    }

    /// Cria a fatura com seus rateios. Ordem das validações: total
    /// positivo, referências dentro do tenant, depois o motor de rateio.
    /// Nada é gravado antes de todas passarem.
    pub async fn create_expense(
        &self,
        tenant_id: Uuid,
        fields: NewExpense,
        allocations: Vec<AllocationRequest>,
    ) -> Result<ExpenseDetail, AppError> {
        if fields.total_amount <= Decimal::ZERO {
            return Err(AppError::AmountNotPositive);
        }

        if !self
            .directory_repo
            .company_exists(tenant_id, fields.company_id)
            .await?
        {
            return Err(AppError::CompanyNotFound);
        }

        let project_ids: Vec<Uuid> = allocations.iter().map(|a| a.project_id).collect();
        self.directory_repo
            .assert_projects_in_tenant(tenant_id, &project_ids)
            .await?;

        let normalized = allocation::normalize_set(fields.total_amount, &allocations)?;

        let mut tx = self.pool.begin().await?;

        let expense = self.repo.insert_expense(&mut *tx, tenant_id, &fields).await?;
        for alloc in &normalized {
            self.repo.insert_allocation(&mut *tx, expense.id, alloc).await?;
        }

        let detail = self.load_detail(&mut tx, tenant_id, expense.id).await?;
        tx.commit().await?;

        tracing::info!(
            "📄 Fatura {} criada com {} rateio(s).",
            detail.expense.invoice_number,
            detail.allocations.len()
        );
        Ok(detail)
    }

    pub async fn get_expense(
        &self,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<ExpenseDetail, AppError> {
        let with_company = self
            .repo
            .find_with_company(&self.pool, tenant_id, expense_id)
            .await?
            .ok_or(AppError::ExpenseNotFound)?;

        let allocations = self
            .repo
            .allocation_details(&self.pool, expense_id, None)
            .await?;

        Ok(ExpenseDetail {
            expense: with_company.expense,
            company_name: with_company.company_name,
            allocations,
        })
    }

    /// Listagem paginada com busca textual e filtro por projeto. Com o
    /// filtro ativo, cada fatura vem apenas com os rateios do projeto
    /// pedido.
    pub async fn list_expenses(
        &self,
        tenant_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
        search: Option<&str>,
        project_id: Option<Uuid>,
    ) -> Result<Paginated<ExpenseDetail>, AppError> {
        let (page, page_size) = pagination::clamp(page, page_size);
        let offset = (page - 1) * page_size;

        let total = self.repo.count(tenant_id, search, project_id).await?;
        let rows = self
            .repo
            .list(tenant_id, search, project_id, page_size, offset)
            .await?;

        let expense_ids: Vec<Uuid> = rows.iter().map(|row| row.expense.id).collect();
        let allocations = self
            .repo
            .allocation_details_for_expenses(&expense_ids, project_id)
            .await?;

        let mut by_expense: HashMap<Uuid, Vec<AllocationDetail>> = HashMap::new();
        for alloc in allocations {
            by_expense.entry(alloc.expense_id).or_default().push(alloc);
        }

        let data = rows
            .into_iter()
            .map(|row| {
                let allocations = by_expense.remove(&row.expense.id).unwrap_or_default();
                ExpenseDetail {
                    expense: row.expense,
                    company_name: row.company_name,
                    allocations,
                }
            })
            .collect();

        Ok(Paginated::new(data, page, page_size, total))
    }

    /// Atualização parcial. Se vier um conjunto novo de rateios, ele
    /// substitui o anterior por inteiro, validado contra o total vigente
    /// (o novo, se enviado; senão o armazenado).
    pub async fn update_expense(
        &self,
        tenant_id: Uuid,
        expense_id: Uuid,
        changes: ExpenseChanges,
        allocations: Option<Vec<AllocationRequest>>,
    ) -> Result<ExpenseDetail, AppError> {
        let current = self
            .repo
            .find_by_id(tenant_id, expense_id)
            .await?
            .ok_or(AppError::ExpenseNotFound)?;

        if let Some(total) = changes.total_amount {
            if total <= Decimal::ZERO {
                return Err(AppError::AmountNotPositive);
            }
        }

        if let Some(company_id) = changes.company_id {
            if !self.directory_repo.company_exists(tenant_id, company_id).await? {
                return Err(AppError::CompanyNotFound);
            }
        }

        let effective_total = changes.total_amount.unwrap_or(current.total_amount);

        let normalized = match &allocations {
            Some(requests) => {
                let project_ids: Vec<Uuid> = requests.iter().map(|a| a.project_id).collect();
                self.directory_repo
                    .assert_projects_in_tenant(tenant_id, &project_ids)
                    .await?;
                Some(allocation::normalize_set(effective_total, requests)?)
            }
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        self.repo
            .update_expense(&mut *tx, tenant_id, expense_id, &changes)
            .await?;

        if let Some(normalized) = &normalized {
            // Substituição integral: apaga tudo e regrava, nunca um merge.
            self.repo.delete_allocations(&mut *tx, expense_id).await?;
            for alloc in normalized {
                self.repo.insert_allocation(&mut *tx, expense_id, alloc).await?;
            }
        }

        let detail = self.load_detail(&mut tx, tenant_id, expense_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Remove a fatura, desde que não exista pagamento apontando para ela.
    /// A conferência roda antes; o DELETE condicional no repositório fecha
    /// a janela de corrida e a FK com RESTRICT é a última barreira.
    pub async fn delete_expense(&self, tenant_id: Uuid, expense_id: Uuid) -> Result<(), AppError> {
        let expense = self
            .repo
            .find_by_id(tenant_id, expense_id)
            .await?
            .ok_or(AppError::ExpenseNotFound)?;

        let linked = self
            .payment_repo
            .count_by_expense(tenant_id, expense_id)
            .await?;
        if linked > 0 {
            return Err(AppError::ExpenseHasPayments {
                invoice_number: expense.invoice_number,
                count: linked,
            });
        }

        let deleted = self.repo.delete_if_unpaid(tenant_id, expense_id).await?;
        if !deleted {
            // Alguém pagou ou removeu a fatura entre a conferência e o
            // DELETE; reavalia para responder o motivo certo.
            let linked = self
                .payment_repo
                .count_by_expense(tenant_id, expense_id)
                .await?;
            if linked > 0 {
                return Err(AppError::ExpenseHasPayments {
                    invoice_number: expense.invoice_number,
                    count: linked,
                });
            }
            return Err(AppError::ExpenseNotFound);
        }

        tracing::info!("🗑️ Fatura {} removida.", expense.invoice_number);
        Ok(())
    }

    /// Monta a resposta completa dentro da transação em andamento, para
    /// enxergar as linhas recém-escritas antes do commit.
    async fn load_detail(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: Uuid,
        expense_id: Uuid,
    ) -> Result<ExpenseDetail, AppError> {
        let with_company = self
            .repo
            .find_with_company(&mut **tx, tenant_id, expense_id)
            .await?
            .ok_or(AppError::ExpenseNotFound)?;

        let allocations = self
            .repo
            .allocation_details(&mut **tx, expense_id, None)
            .await?;

        Ok(ExpenseDetail {
            expense: with_company.expense,
            company_name: with_company.company_name,
            allocations,
        })
    }
}
