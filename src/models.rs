pub mod auth;
pub mod finance;
pub mod payment;
pub mod procurement;
pub mod sale;
