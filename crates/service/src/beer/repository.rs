use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use models::beer::{Beer, BeerId, NewBeer};

use crate::errors::ServiceError;
use crate::storage::json_table_store::JsonTableStore;

/// Quantity recomputation run against the current record under the store's
/// write lock. Returns the new quantity or the domain error rejecting it.
pub type QuantityUpdate = Box<dyn FnOnce(&Beer) -> Result<i64, ServiceError> + Send>;

/// Store contract for beer records: lookup by id/name, full listing, insert
/// with store-assigned id, delete, and an atomic per-record quantity update.
#[async_trait]
pub trait BeerRepository: Send + Sync {
    /// Insert with the uniqueness check and the id assignment in one atomic
    /// step; `Ok(None)` means another record already holds the name.
    async fn insert(&self, input: NewBeer) -> Result<Option<Beer>, ServiceError>;
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, ServiceError>;
    async fn find_all(&self) -> Result<Vec<Beer>, ServiceError>;
    async fn delete_by_id(&self, id: BeerId) -> Result<bool, ServiceError>;
    /// Single logical read-modify-write: the update closure decides the new
    /// quantity; a rejection leaves the stored record untouched.
    /// `Ok(None)` means the id is unknown.
    async fn update_quantity(
        &self,
        id: BeerId,
        update: QuantityUpdate,
    ) -> Result<Option<Beer>, ServiceError>;
}

/// JSON file-backed repository implementation.
#[derive(Clone)]
pub struct JsonBeerRepository {
    store: Arc<JsonTableStore<Beer>>,
}

impl JsonBeerRepository {
    /// Open the repository at the given data file, creating it if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonTableStore::<Beer>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl BeerRepository for JsonBeerRepository {
    async fn insert(&self, input: NewBeer) -> Result<Option<Beer>, ServiceError> {
        let name = input.name.clone();
        self.store
            .insert_unique(
                move |existing| existing.name == name,
                |id| input.into_beer(BeerId(id), Utc::now()),
            )
            .await
    }

    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, ServiceError> {
        Ok(self.store.get(id.0).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, ServiceError> {
        Ok(self.store.find(|beer| beer.name == name).await)
    }

    async fn find_all(&self) -> Result<Vec<Beer>, ServiceError> {
        Ok(self.store.list().await)
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<bool, ServiceError> {
        self.store.remove(id.0).await
    }

    async fn update_quantity(
        &self,
        id: BeerId,
        update: QuantityUpdate,
    ) -> Result<Option<Beer>, ServiceError> {
        self.store
            .update_row(id.0, |beer| {
                let quantity = update(beer)?;
                let mut updated = beer.clone();
                updated.quantity = quantity;
                Ok(updated)
            })
            .await
    }
}
