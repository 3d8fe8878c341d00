pub mod finance;
pub mod payments;
pub mod procurements;
pub mod sales;
