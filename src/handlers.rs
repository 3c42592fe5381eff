pub mod financial;
pub mod health;
