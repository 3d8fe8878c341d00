pub mod directory_repo;
pub use directory_repo::DirectoryRepository;
pub mod procurement_repo;
pub use procurement_repo::ProcurementRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
