// src/services/reconciliation_service.rs
//
// Reconciliação financeira: funde faturas rateadas, pagamentos e vendas
// num razão único por projeto, calculado a cada consulta. Nenhum
// lançamento é persistido; a fonte da verdade são as três tabelas.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{
        AllocatedExpenseRow, EntryKind, FinancialEntry, PaymentAllocationRow,
        ProjectEntriesReport, ProjectFinancialSummary,
    },
    models::sale::SaleWithCompany,
};

#[derive(Clone)]
pub struct ReconciliationService {
    repo: FinanceRepository,
}

impl ReconciliationService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    /// Monta o razão por projeto do tenant. Com filtro de projeto, só os
    /// rateios (e as frações de pagamento) daquele projeto entram e as
    /// vendas ficam de fora; sem filtro, as vendas aparecem no balde sem
    /// projeto.
    pub async fn project_entries(
        &self,
        tenant_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<ProjectEntriesReport, AppError> {
        let expenses = self.repo.allocated_expense_rows(tenant_id, project_id).await?;
        let payments = self.repo.payment_allocation_rows(tenant_id, project_id).await?;
        let sales = if project_id.is_none() {
            self.repo.sale_rows(tenant_id).await?
        } else {
            Vec::new()
        };

        let entries = build_entries(&expenses, &payments, &sales);
        let summary = summarize(&entries);

        Ok(ProjectEntriesReport { entries, summary })
    }
}

/// Valor efetivo de um rateio: o valor gravado ou, na falta dele, o
/// percentual aplicado ao total. Linhas sem nenhum dos dois são lixo
/// herdado e ficam de fora do razão.
fn effective_allocation(
    total: Decimal,
    allocated_amount: Option<Decimal>,
    allocated_percentage: Option<Decimal>,
) -> Option<Decimal> {
    match allocated_amount {
        Some(amount) => Some(amount),
        None => allocated_percentage.map(|pct| total * pct / Decimal::ONE_HUNDRED),
    }
}

fn build_entries(
    expenses: &[AllocatedExpenseRow],
    payments: &[PaymentAllocationRow],
    sales: &[SaleWithCompany],
) -> Vec<FinancialEntry> {
    let mut entries = Vec::new();

    // Despesas: um lançamento negativo por rateio.
    for row in expenses {
        let Some(amount) =
            effective_allocation(row.total_amount, row.allocated_amount, row.allocated_percentage)
        else {
            continue;
        };
        if amount <= Decimal::ZERO {
            continue;
        }

        entries.push(FinancialEntry {
            id: format!("{}-{}", row.expense_id, row.allocation_id),
            kind: EntryKind::Expense,
            date: row.date,
            amount: -amount,
            description: format!("Fatura {} - {}", row.invoice_number, row.company_name),
            project_id: Some(row.project_id),
            project_name: Some(row.project_name.clone()),
            company_name: Some(row.company_name.clone()),
            invoice_number: Some(row.invoice_number.clone()),
            reference_number: None,
        });
    }

    // Pagamentos: cada pagamento é repartido entre os projetos na mesma
    // proporção do rateio da fatura paga.
    for row in payments {
        if row.expense_total <= Decimal::ZERO {
            continue;
        }
        let Some(allocated) =
            effective_allocation(row.expense_total, row.allocated_amount, row.allocated_percentage)
        else {
            continue;
        };

        let share = row.amount * allocated / row.expense_total;
        if share <= Decimal::ZERO {
            continue;
        }

        entries.push(FinancialEntry {
            id: format!("{}-{}", row.payment_id, row.allocation_id),
            kind: EntryKind::Payment,
            date: row.payment_date,
            amount: share,
            description: format!(
                "Pagamento {}",
                row.reference_number.as_deref().unwrap_or(&row.invoice_number)
            ),
            project_id: Some(row.project_id),
            project_name: Some(row.project_name.clone()),
            company_name: Some(row.company_name.clone()),
            invoice_number: Some(row.invoice_number.clone()),
            reference_number: row.reference_number.clone(),
        });
    }

    // Vendas: receita integral, sem projeto.
    for row in sales {
        entries.push(FinancialEntry {
            id: row.sale.id.to_string(),
            kind: EntryKind::Sale,
            date: row.sale.date,
            amount: row.sale.total_amount,
            description: format!("Venda {} - {}", row.sale.invoice_number, row.company_name),
            project_id: None,
            project_name: None,
            company_name: Some(row.company_name.clone()),
            invoice_number: Some(row.sale.invoice_number.clone()),
            reference_number: None,
        });
    }

    // Data decrescente; a ordenação estável preserva a ordem de origem
    // (despesas, pagamentos, vendas) para datas iguais.
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

/// Agrega os lançamentos por projeto, na ordem de primeira aparição.
/// Vendas caem no balde sem projeto. net_amount compara vendas com
/// despesas; pagamentos não entram no resultado para não contar a mesma
/// despesa duas vezes.
fn summarize(entries: &[FinancialEntry]) -> Vec<ProjectFinancialSummary> {
    let mut summaries: Vec<ProjectFinancialSummary> = Vec::new();
    let mut index: HashMap<Option<Uuid>, usize> = HashMap::new();

    for entry in entries {
        let position = match index.get(&entry.project_id) {
            Some(position) => *position,
            None => {
                summaries.push(ProjectFinancialSummary {
                    project_id: entry.project_id,
                    project_name: entry.project_name.clone(),
                    total_expenses: Decimal::ZERO,
                    total_payments: Decimal::ZERO,
                    total_sales: Decimal::ZERO,
                    net_amount: Decimal::ZERO,
                });
                let position = summaries.len() - 1;
                index.insert(entry.project_id, position);
                position
            }
        };

        let summary = &mut summaries[position];
        match entry.kind {
            EntryKind::Expense => summary.total_expenses += entry.amount.abs(),
            EntryKind::Payment => summary.total_payments += entry.amount,
            EntryKind::Sale => summary.total_sales += entry.amount,
        }
        summary.net_amount = summary.total_sales - summary.total_expenses;
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::procurement::InvoiceStatus;
    use crate::models::sale::Sale;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn expense_row(
        project_id: Uuid,
        project_name: &str,
        day: u32,
        total: i64,
        allocated_amount: Option<Decimal>,
        allocated_percentage: Option<Decimal>,
    ) -> AllocatedExpenseRow {
        AllocatedExpenseRow {
            expense_id: Uuid::new_v4(),
            allocation_id: Uuid::new_v4(),
            project_id,
            project_name: project_name.to_string(),
            company_name: "ACME".to_string(),
            invoice_number: "NF-001".to_string(),
            date: date(day),
            total_amount: Decimal::from(total),
            allocated_amount,
            allocated_percentage,
        }
    }

    fn payment_row(
        project_id: Uuid,
        project_name: &str,
        day: u32,
        amount: i64,
        expense_total: i64,
        allocated_amount: Option<Decimal>,
        allocated_percentage: Option<Decimal>,
    ) -> PaymentAllocationRow {
        PaymentAllocationRow {
            payment_id: Uuid::new_v4(),
            allocation_id: Uuid::new_v4(),
            project_id,
            project_name: project_name.to_string(),
            company_name: "ACME".to_string(),
            invoice_number: "NF-001".to_string(),
            reference_number: Some("TED-1".to_string()),
            payment_date: date(day),
            amount: Decimal::from(amount),
            expense_total: Decimal::from(expense_total),
            allocated_amount,
            allocated_percentage,
        }
    }

    fn sale_row(day: u32, total: i64, invoice: &str) -> SaleWithCompany {
        SaleWithCompany {
            sale: Sale {
                id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                invoice_number: invoice.to_string(),
                date: date(day),
                total_amount: Decimal::from(total),
                status: InvoiceStatus::Pending,
                notes: None,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
                updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            },
            company_name: "Cliente Beta".to_string(),
        }
    }

    #[test]
    fn despesa_rateada_gera_lancamentos_negativos() {
        let alfa = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let expenses = vec![
            expense_row(alfa, "Alfa", 10, 1000, Some(Decimal::from(600)), None),
            expense_row(beta, "Beta", 10, 1000, Some(Decimal::from(400)), None),
        ];

        let entries = build_entries(&expenses, &[], &[]);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == EntryKind::Expense));
        assert!(entries.iter().all(|e| e.amount < Decimal::ZERO));

        let total: Decimal = entries.iter().map(|e| e.amount).sum();
        assert_eq!(total, Decimal::from(-1000));
    }

    #[test]
    fn rateio_sem_valor_usa_o_percentual() {
        let expenses = vec![expense_row(
            Uuid::new_v4(),
            "Alfa",
            10,
            1000,
            None,
            Some(Decimal::from(25)),
        )];

        let entries = build_entries(&expenses, &[], &[]);
        assert_eq!(entries[0].amount, Decimal::from(-250));
    }

    #[test]
    fn rateio_sem_valor_e_sem_percentual_fica_de_fora() {
        let expenses = vec![
            expense_row(Uuid::new_v4(), "Alfa", 10, 1000, None, None),
            expense_row(Uuid::new_v4(), "Beta", 10, 1000, Some(Decimal::from(1000)), None),
        ];

        let entries = build_entries(&expenses, &[], &[]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project_name.as_deref(), Some("Beta"));
    }

    #[test]
    fn pagamento_reparte_proporcional_ao_rateio() {
        // Fatura de 1000 rateada 600/400; pagamento integral de 1000.
        let alfa = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let payments = vec![
            payment_row(alfa, "Alfa", 15, 1000, 1000, Some(Decimal::from(600)), None),
            payment_row(beta, "Beta", 15, 1000, 1000, Some(Decimal::from(400)), None),
        ];

        let entries = build_entries(&[], &payments, &[]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, Decimal::from(600));
        assert_eq!(entries[1].amount, Decimal::from(400));
        assert!(entries.iter().all(|e| e.kind == EntryKind::Payment));
    }

    #[test]
    fn pagamento_parcial_reparte_a_fracao() {
        // Pagamento de 500 sobre fatura de 1000 rateada 60%/40%.
        let payments = vec![
            payment_row(Uuid::new_v4(), "Alfa", 15, 500, 1000, Some(Decimal::from(600)), None),
            payment_row(Uuid::new_v4(), "Beta", 15, 500, 1000, Some(Decimal::from(400)), None),
        ];

        let entries = build_entries(&[], &payments, &[]);
        assert_eq!(entries[0].amount, Decimal::from(300));
        assert_eq!(entries[1].amount, Decimal::from(200));
    }

    #[test]
    fn pagamento_de_fatura_com_total_zerado_fica_de_fora() {
        let payments = vec![payment_row(
            Uuid::new_v4(),
            "Alfa",
            15,
            500,
            0,
            Some(Decimal::from(600)),
            None,
        )];

        assert!(build_entries(&[], &payments, &[]).is_empty());
    }

    #[test]
    fn identificadores_compostos_sao_estaveis() {
        let expenses = vec![expense_row(
            Uuid::new_v4(),
            "Alfa",
            10,
            1000,
            Some(Decimal::from(1000)),
            None,
        )];
        let payments = vec![payment_row(
            Uuid::new_v4(),
            "Alfa",
            15,
            1000,
            1000,
            Some(Decimal::from(1000)),
            None,
        )];

        let entries = build_entries(&expenses, &payments, &[]);

        let expense_entry = entries.iter().find(|e| e.kind == EntryKind::Expense).unwrap();
        let expected = format!("{}-{}", expenses[0].expense_id, expenses[0].allocation_id);
        assert_eq!(expense_entry.id, expected);

        let payment_entry = entries.iter().find(|e| e.kind == EntryKind::Payment).unwrap();
        let expected = format!("{}-{}", payments[0].payment_id, payments[0].allocation_id);
        assert_eq!(payment_entry.id, expected);
    }

    #[test]
    fn ordena_por_data_decrescente() {
        let expenses = vec![
            expense_row(Uuid::new_v4(), "Alfa", 5, 100, Some(Decimal::from(100)), None),
            expense_row(Uuid::new_v4(), "Beta", 20, 100, Some(Decimal::from(100)), None),
        ];
        let sales = vec![sale_row(12, 500, "FV-1")];

        let entries = build_entries(&expenses, &[], &sales);
        let days: Vec<u32> = entries
            .iter()
            .map(|e| chrono::Datelike::day(&e.date))
            .collect();
        assert_eq!(days, vec![20, 12, 5]);
    }

    #[test]
    fn vendas_entram_inteiras_e_sem_projeto() {
        let sales = vec![sale_row(12, 2500, "FV-1")];
        let entries = build_entries(&[], &[], &sales);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Sale);
        assert_eq!(entries[0].amount, Decimal::from(2500));
        assert_eq!(entries[0].project_id, None);
    }

    #[test]
    fn resumo_agrupa_por_projeto_na_ordem_de_aparicao() {
        let alfa = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let expenses = vec![
            expense_row(alfa, "Alfa", 20, 1000, Some(Decimal::from(600)), None),
            expense_row(beta, "Beta", 10, 1000, Some(Decimal::from(400)), None),
        ];
        let payments = vec![payment_row(alfa, "Alfa", 15, 1000, 1000, Some(Decimal::from(600)), None)];
        let sales = vec![sale_row(12, 2500, "FV-1")];

        let entries = build_entries(&expenses, &payments, &sales);
        let summary = summarize(&entries);

        // Ordem de aparição nos lançamentos (data decrescente):
        // Alfa (dia 20), Alfa pagamento (15), venda (12), Beta (10).
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].project_id, Some(alfa));
        assert_eq!(summary[1].project_id, None);
        assert_eq!(summary[2].project_id, Some(beta));

        let alfa_summary = &summary[0];
        assert_eq!(alfa_summary.total_expenses, Decimal::from(600));
        assert_eq!(alfa_summary.total_payments, Decimal::from(600));
        assert_eq!(alfa_summary.total_sales, Decimal::ZERO);
        // Pagamentos não entram no resultado.
        assert_eq!(alfa_summary.net_amount, Decimal::from(-600));

        let sales_bucket = &summary[1];
        assert_eq!(sales_bucket.total_sales, Decimal::from(2500));
        assert_eq!(sales_bucket.net_amount, Decimal::from(2500));
    }

    #[test]
    fn despesas_entram_no_resumo_pelo_valor_absoluto() {
        let expenses = vec![expense_row(
            Uuid::new_v4(),
            "Alfa",
            10,
            1000,
            Some(Decimal::from(1000)),
            None,
        )];

        let summary = summarize(&build_entries(&expenses, &[], &[]));
        assert_eq!(summary[0].total_expenses, Decimal::from(1000));
        assert_eq!(summary[0].net_amount, Decimal::from(-1000));
    }
}
