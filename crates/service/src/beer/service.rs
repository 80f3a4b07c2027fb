use std::sync::Arc;

use tracing::{info, instrument};

use models::beer::{Beer, BeerId, NewBeer};

use crate::beer::repository::BeerRepository;
use crate::errors::ServiceError;

/// Stock service encapsulating the beer inventory business rules: name
/// uniqueness, existence checks, and quantity bounds. Sole gateway for
/// mutations against the repository; holds no state across calls.
pub struct BeerService<R: BeerRepository> {
    repo: Arc<R>,
}

impl<R: BeerRepository> BeerService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Register a new beer. Rejects duplicate names (case-sensitive exact
    /// match); the repository checks the name and assigns the id in one
    /// atomic step, so racing registrations cannot both land.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn register(&self, input: NewBeer) -> Result<Beer, ServiceError> {
        input.validate()?;
        let name = input.name.clone();
        let Some(beer) = self.repo.insert(input).await? else {
            return Err(ServiceError::AlreadyRegistered(name));
        };
        info!(id = %beer.id, "beer_registered");
        Ok(beer)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Beer, ServiceError> {
        self.repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::beer_not_found_by_name(name))
    }

    pub async fn list_all(&self) -> Result<Vec<Beer>, ServiceError> {
        self.repo.find_all().await
    }

    pub async fn delete_by_id(&self, id: BeerId) -> Result<(), ServiceError> {
        if self.repo.delete_by_id(id).await? {
            info!(%id, "beer_deleted");
            Ok(())
        } else {
            Err(ServiceError::beer_not_found(id))
        }
    }

    /// Raise the stored quantity by `quantity`, capped at the record's max.
    /// Boundary hits (resulting quantity exactly max) succeed; anything past
    /// it is rejected with `StockExceeded` and the record stays untouched.
    #[instrument(skip(self), fields(%id))]
    pub async fn increment(&self, id: BeerId, quantity: i64) -> Result<Beer, ServiceError> {
        ensure_positive(quantity)?;
        let updated = self
            .repo
            .update_quantity(
                id,
                Box::new(move |beer| {
                    // An overflowing sum is by definition above max.
                    match beer.quantity.checked_add(quantity) {
                        Some(after) if after <= beer.max => Ok(after),
                        _ => Err(ServiceError::StockExceeded { id: beer.id, quantity }),
                    }
                }),
            )
            .await?;
        let beer = updated.ok_or_else(|| ServiceError::beer_not_found(id))?;
        info!(quantity = beer.quantity, "stock_incremented");
        Ok(beer)
    }

    /// Lower the stored quantity by `quantity`, floored at zero. Boundary hits
    /// (resulting quantity exactly 0) succeed; going below is rejected with
    /// `MinimumStockExceeded` and the record stays untouched.
    #[instrument(skip(self), fields(%id))]
    pub async fn decrement(&self, id: BeerId, quantity: i64) -> Result<Beer, ServiceError> {
        ensure_positive(quantity)?;
        let updated = self
            .repo
            .update_quantity(
                id,
                Box::new(move |beer| {
                    // An overflowing difference is by definition below zero.
                    match beer.quantity.checked_sub(quantity) {
                        Some(after) if after >= 0 => Ok(after),
                        _ => Err(ServiceError::MinimumStockExceeded { id: beer.id, quantity }),
                    }
                }),
            )
            .await?;
        let beer = updated.ok_or_else(|| ServiceError::beer_not_found(id))?;
        info!(quantity = beer.quantity, "stock_decremented");
        Ok(beer)
    }
}

fn ensure_positive(quantity: i64) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::Validation("quantity must be a positive integer".into()));
    }
    Ok(())
}
