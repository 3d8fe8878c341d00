pub mod allocation;
pub mod auth;
pub mod payment_service;
pub mod procurement_service;
pub mod reconciliation_service;
pub mod sale_service;

pub use auth::AuthService;
pub use payment_service::PaymentService;
pub use procurement_service::ProcurementService;
pub use reconciliation_service::ReconciliationService;
pub use sale_service::SaleService;
