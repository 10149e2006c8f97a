use thiserror::Error;

use super::order::UnavailableLine;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Some items are not available in requested quantity")]
    InsufficientStock(Vec<UnavailableLine>),
    #[error("Order not found")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(String),
}
