use models::beer::BeerId;
use thiserror::Error;

/// Service-level error taxonomy. The first four variants are expected domain
/// outcomes, not defects; they surface unchanged to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("beer with name {0} is already registered")]
    AlreadyRegistered(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("increment of {quantity} on beer {id} exceeds the max stock capacity")]
    StockExceeded { id: BeerId, quantity: i64 },
    #[error("decrement of {quantity} on beer {id} goes below the minimum stock")]
    MinimumStockExceeded { id: BeerId, quantity: i64 },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn beer_not_found(id: BeerId) -> Self {
        Self::NotFound(format!("beer with id {} not found", id))
    }

    pub fn beer_not_found_by_name(name: &str) -> Self {
        Self::NotFound(format!("beer with name {} not found", name))
    }
}
