// src/services/payment_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{self, Paginated},
    db::{PaymentRepository, ProcurementRepository},
    models::payment::{NewPayment, PaymentChanges, PaymentWithInvoice},
};

/// Ciclo de vida dos pagamentos. Um pagamento sempre aponta para uma
/// fatura existente do mesmo tenant; o vínculo com projetos é indireto,
/// via rateio da fatura, e resolvido só na reconciliação.
#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
    procurement_repo: ProcurementRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository, procurement_repo: ProcurementRepository) -> Self {
        Self {
            repo,
            procurement_repo,
        }
    }

    pub async fn create_payment(
        &self,
        tenant_id: Uuid,
        fields: NewPayment,
    ) -> Result<PaymentWithInvoice, AppError> {
        if fields.amount <= Decimal::ZERO {
            return Err(AppError::AmountNotPositive);
        }

        // A fatura precisa resolver dentro do tenant.
        let expense = self
            .procurement_repo
            .find_by_id(tenant_id, fields.expense_id)
            .await?
            .ok_or(AppError::ExpenseNotFound)?;

        let payment = self.repo.insert(tenant_id, &fields).await?;

        tracing::info!(
            "💸 Pagamento de {} registrado para a fatura {}.",
            payment.amount,
            expense.invoice_number
        );
        Ok(PaymentWithInvoice {
            payment,
            expense_invoice_number: expense.invoice_number,
        })
    }

    pub async fn list_payments(
        &self,
        tenant_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Paginated<PaymentWithInvoice>, AppError> {
        let (page, page_size) = pagination::clamp(page, page_size);
        let offset = (page - 1) * page_size;

        let total = self.repo.count(tenant_id).await?;
        let data = self.repo.list_with_invoice(tenant_id, page_size, offset).await?;

        Ok(Paginated::new(data, page, page_size, total))
    }

    pub async fn update_payment(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        changes: PaymentChanges,
    ) -> Result<PaymentWithInvoice, AppError> {
        if let Some(amount) = changes.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::AmountNotPositive);
            }
        }

        // Reapontamento de fatura também precisa resolver dentro do tenant.
        if let Some(expense_id) = changes.expense_id {
            self.procurement_repo
                .find_by_id(tenant_id, expense_id)
                .await?
                .ok_or(AppError::ExpenseNotFound)?;
        }

        let updated = self.repo.update(tenant_id, payment_id, &changes).await?;
        if !updated {
            return Err(AppError::PaymentNotFound);
        }

        self.repo
            .find_with_invoice(tenant_id, payment_id)
            .await?
            .ok_or(AppError::PaymentNotFound)
    }

    pub async fn delete_payment(&self, tenant_id: Uuid, payment_id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.delete(tenant_id, payment_id).await?;
        if !deleted {
            return Err(AppError::PaymentNotFound);
        }
        Ok(())
    }
}
