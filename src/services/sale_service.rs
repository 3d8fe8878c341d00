// src/services/sale_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{self, Paginated},
    db::{DirectoryRepository, SaleRepository},
    models::sale::{NewSale, SaleChanges, SaleWithCompany},
};

/// Ciclo de vida das faturas de venda. Vendas não têm rateio nem
/// pagamentos vinculados, então a exclusão é direta.
#[derive(Clone)]
pub struct SaleService {
    repo: SaleRepository,
    directory_repo: DirectoryRepository,
}

impl SaleService {
    pub fn new(repo: SaleRepository, directory_repo: DirectoryRepository) -> Self {
        Self {
            repo,
            directory_repo,
        }
    }

    pub async fn create_sale(
        &self,
        tenant_id: Uuid,
        fields: NewSale,
    ) -> Result<SaleWithCompany, AppError> {
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

        let sale = self.repo.insert(tenant_id, &fields).await?;

        // A inserção devolve só a linha; o nome do cliente sai da busca
        // completa para manter uma única montagem de resposta.
        self.repo
            .find_with_company(tenant_id, sale.id)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn get_sale(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
    ) -> Result<SaleWithCompany, AppError> {
        self.repo
            .find_with_company(tenant_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn list_sales(
        &self,
        tenant_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Paginated<SaleWithCompany>, AppError> {
        let (page, page_size) = pagination::clamp(page, page_size);
        let offset = (page - 1) * page_size;

        let total = self.repo.count(tenant_id).await?;
        let data = self.repo.list_with_company(tenant_id, page_size, offset).await?;

        Ok(Paginated::new(data, page, page_size, total))
    }

    pub async fn update_sale(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        changes: SaleChanges,
    ) -> Result<SaleWithCompany, AppError> {
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

        let updated = self.repo.update(tenant_id, sale_id, &changes).await?;
        if !updated {
            return Err(AppError::SaleNotFound);
        }

        self.repo
            .find_with_company(tenant_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn delete_sale(&self, tenant_id: Uuid, sale_id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.delete(tenant_id, sale_id).await?;
        if !deleted {
            return Err(AppError::SaleNotFound);
        }
        Ok(())
    }
}
