use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{SweetError, SweetResult};
use crate::models::{SortOrder, Sweet, SweetChanges, SweetFilter};

/// Repository trait for Sweet persistence.
///
/// Name uniqueness and the quantity floor are enforced here, atomically,
/// not by a check in the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SweetRepository: Send + Sync {
    /// Fails with `DuplicateName` when the name is taken
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet>;

    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>>;

    async fn get_by_name(&self, name: &str) -> SweetResult<Option<Sweet>>;

    /// All sweets in storage order
    async fn list(&self) -> SweetResult<Vec<Sweet>>;

    async fn search(&self, filter: SweetFilter) -> SweetResult<Vec<Sweet>>;

    /// `Ok(None)` when the id does not resolve
    async fn update(&self, id: Uuid, changes: SweetChanges) -> SweetResult<Option<Sweet>>;

    /// Returns the removed sweet, `Ok(None)` when the id does not resolve
    async fn delete(&self, id: Uuid) -> SweetResult<Option<Sweet>>;

    /// Decrement quantity by one if it is at least one.
    /// Fails with `NotFound` or `OutOfStock`.
    async fn purchase(&self, id: Uuid) -> SweetResult<Sweet>;

    /// Increment quantity by `amount`. Fails with `NotFound`.
    async fn restock(&self, id: Uuid, amount: i64) -> SweetResult<Sweet>;
}

/// In-memory implementation of SweetRepository (for development/testing).
///
/// Backed by a `Vec` to keep insertion order for `list`.
#[derive(Debug, Default, Clone)]
pub struct InMemorySweetRepository {
    sweets: Arc<RwLock<Vec<Sweet>>>,
}

impl InMemorySweetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SweetRepository for InMemorySweetRepository {
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet> {
        let mut sweets = self.sweets.write().await;

        if sweets.iter().any(|s| s.name == sweet.name) {
            return Err(SweetError::DuplicateName(sweet.name));
        }

        sweets.push(sweet.clone());

        tracing::info!(sweet_id = %sweet.id, name = %sweet.name, "Created sweet");
        Ok(sweet)
    }

    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        let sweets = self.sweets.read().await;
        Ok(sweets.iter().find(|s| s.id == id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> SweetResult<Option<Sweet>> {
        let sweets = self.sweets.read().await;
        Ok(sweets.iter().find(|s| s.name == name).cloned())
    }

    async fn list(&self) -> SweetResult<Vec<Sweet>> {
        Ok(self.sweets.read().await.clone())
    }

    async fn search(&self, filter: SweetFilter) -> SweetResult<Vec<Sweet>> {
        let sweets = self.sweets.read().await;
        let mut result: Vec<Sweet> = sweets.iter().filter(|s| filter.matches(s)).cloned().collect();

        // Stable sort keeps insertion order among equal prices
        match filter.sort {
            Some(SortOrder::PriceAsc) => result.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some(SortOrder::PriceDesc) => result.sort_by(|a, b| b.price.total_cmp(&a.price)),
            None => {}
        }

        Ok(result)
    }

    async fn update(&self, id: Uuid, changes: SweetChanges) -> SweetResult<Option<Sweet>> {
        let mut sweets = self.sweets.write().await;

        if let Some(ref name) = changes.name {
            if sweets.iter().any(|s| s.id != id && &s.name == name) {
                return Err(SweetError::DuplicateName(name.clone()));
            }
        }

        Ok(sweets.iter_mut().find(|s| s.id == id).map(|sweet| {
            sweet.apply(changes);
            tracing::info!(sweet_id = %id, "Updated sweet");
            sweet.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        let mut sweets = self.sweets.write().await;
        let removed = sweets
            .iter()
            .position(|s| s.id == id)
            .map(|index| sweets.remove(index));

        if removed.is_some() {
            tracing::info!(sweet_id = %id, "Deleted sweet");
        }
        Ok(removed)
    }

    async fn purchase(&self, id: Uuid) -> SweetResult<Sweet> {
        let mut sweets = self.sweets.write().await;
        let sweet = sweets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SweetError::NotFound(id))?;

        if sweet.quantity < 1 {
            return Err(SweetError::OutOfStock(id));
        }

        sweet.quantity -= 1;
        sweet.updated_at = chrono::Utc::now();
        Ok(sweet.clone())
    }

    async fn restock(&self, id: Uuid, amount: i64) -> SweetResult<Sweet> {
        let mut sweets = self.sweets.write().await;
        let sweet = sweets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SweetError::NotFound(id))?;

        sweet.quantity = sweet
            .quantity
            .checked_add(amount)
            .ok_or(SweetError::InvalidRestockAmount)?;
        sweet.updated_at = chrono::Utc::now();
        Ok(sweet.clone())
    }
}
