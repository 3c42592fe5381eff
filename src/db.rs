pub mod financial_repo;
pub use financial_repo::FinancialRepository;
