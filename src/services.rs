pub mod aggregator;
pub mod auth;
pub mod financial_service;
