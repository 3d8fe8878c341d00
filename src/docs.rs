// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common::pagination::{PageMeta, Paginated};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Procurements ---
        handlers::procurements::create_procurement,
        handlers::procurements::list_procurements,
        handlers::procurements::get_procurement,
        handlers::procurements::update_procurement,
        handlers::procurements::delete_procurement,

        // --- Payments ---
        handlers::payments::create_payment,
        handlers::payments::list_payments,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Finance ---
        handlers::finance::project_entries,
    ),
    components(
        schemas(
            // --- Procurements ---
            models::procurement::PaymentMethod,
            models::procurement::InvoiceStatus,
            models::procurement::Expense,
            models::procurement::AllocationDetail,
            models::procurement::ExpenseDetail,
            handlers::procurements::AllocationPayload,
            handlers::procurements::CreateExpensePayload,
            handlers::procurements::UpdateExpensePayload,

            // --- Payments ---
            models::payment::Payment,
            models::payment::PaymentWithInvoice,
            handlers::payments::CreatePaymentPayload,
            handlers::payments::UpdatePaymentPayload,

            // --- Sales ---
            models::sale::Sale,
            models::sale::SaleWithCompany,
            handlers::sales::CreateSalePayload,
            handlers::sales::UpdateSalePayload,

            // --- Finance ---
            models::finance::EntryKind,
            models::finance::FinancialEntry,
            models::finance::ProjectFinancialSummary,
            models::finance::ProjectEntriesReport,

            // --- Auth ---
            models::auth::Role,

            // --- Paginação ---
            PageMeta,
            Paginated<models::procurement::ExpenseDetail>,
            Paginated<models::payment::PaymentWithInvoice>,
            Paginated<models::sale::SaleWithCompany>,
        )
    ),
    tags(
        (name = "Procurements", description = "Faturas de Compra e Rateios por Projeto"),
        (name = "Payments", description = "Pagamentos de Faturas de Compra"),
        (name = "Sales", description = "Faturas de Venda"),
        (name = "Finance", description = "Razão Financeiro por Projeto")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
