pub mod auth;
pub mod financial;
