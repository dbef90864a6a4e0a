pub mod error;
pub mod health;
pub mod identity;
pub mod products;

pub use error::AppError;
