//! MongoDB implementation of SweetRepository

use async_trait::async_trait;
use database::mongodb::is_duplicate_key_error;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{SweetError, SweetResult};
use crate::models::{SortOrder, Sweet, SweetChanges, SweetFilter};
use crate::repository::SweetRepository;

pub const SWEETS_COLLECTION: &str = "sweets";

/// MongoDB implementation of the SweetRepository
#[derive(Clone)]
pub struct MongoSweetRepository {
    collection: Collection<Sweet>,
}

impl MongoSweetRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, SWEETS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Sweet>(collection_name);
        Self { collection }
    }

    /// Initialize indexes. The unique name index is what makes
    /// concurrent adds with the same name safe.
    pub async fn init_indexes(&self) -> SweetResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_name_unique".to_string())
                        .build(),
                )
                .build(),
            // Price range queries and sorting
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "admins": 1 })
                .options(IndexOptions::builder().name("idx_admins".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Sweet indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Sweet> {
        &self.collection
    }

    fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// Build a MongoDB filter document from SweetFilter.
    ///
    /// Text criteria are escaped, so they only ever match literally.
    fn build_filter(filter: &SweetFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref name) = filter.name {
            doc.insert("name", doc! { "$regex": regex::escape(name), "$options": "i" });
        }

        if let Some(ref category) = filter.category {
            doc.insert(
                "category",
                doc! { "$regex": regex::escape(category), "$options": "i" },
            );
        }

        if filter.min_price.is_some() || filter.max_price.is_some() {
            let mut price_filter = doc! {};
            if let Some(min) = filter.min_price {
                price_filter.insert("$gte", min);
            }
            if let Some(max) = filter.max_price {
                price_filter.insert("$lte", max);
            }
            doc.insert("price", price_filter);
        }

        if let Some(admin) = filter.admin {
            doc.insert("admins", admin.to_string());
        }

        doc
    }

    fn build_sort(sort: Option<SortOrder>) -> Option<Document> {
        sort.map(|order| match order {
            SortOrder::PriceAsc => doc! { "price": 1 },
            SortOrder::PriceDesc => doc! { "price": -1 },
        })
    }

    fn build_update(changes: &SweetChanges) -> Document {
        let mut set = doc! { "updated_at": Self::now() };

        if let Some(ref name) = changes.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref category) = changes.category {
            set.insert("category", category.as_str());
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(quantity) = changes.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(ref image) = changes.image {
            set.insert("image", image.as_str());
        }
        if let Some(ref admins) = changes.admins {
            let ids: Vec<Bson> = admins.iter().map(|id| Bson::String(id.to_string())).collect();
            set.insert("admins", ids);
        }

        doc! { "$set": set }
    }

    /// Matches only when adding `amount` cannot overflow the stored quantity
    fn restock_filter(id: Uuid, amount: i64) -> Document {
        doc! {
            "_id": id.to_string(),
            "quantity": { "$lte": i64::MAX.saturating_sub(amount) }
        }
    }

    async fn exists(&self, id: Uuid) -> SweetResult<bool> {
        let count = self.collection.count_documents(Self::by_id(id)).await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl SweetRepository for MongoSweetRepository {
    #[instrument(skip(self, sweet), fields(sweet_name = %sweet.name))]
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet> {
        match self.collection.insert_one(&sweet).await {
            Ok(_) => {
                tracing::info!(sweet_id = %sweet.id, "Sweet created successfully");
                Ok(sweet)
            }
            Err(e) if is_duplicate_key_error(&e) => Err(SweetError::DuplicateName(sweet.name)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        Ok(self.collection.find_one(Self::by_id(id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> SweetResult<Option<Sweet>> {
        Ok(self.collection.find_one(doc! { "name": name }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> SweetResult<Vec<Sweet>> {
        let cursor = self.collection.find(doc! {}).await?;
        let sweets: Vec<Sweet> = cursor.try_collect().await?;
        Ok(sweets)
    }

    #[instrument(skip(self))]
    async fn search(&self, filter: SweetFilter) -> SweetResult<Vec<Sweet>> {
        let mut options = FindOptions::default();
        options.sort = Self::build_sort(filter.sort);

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        let sweets: Vec<Sweet> = cursor.try_collect().await?;
        Ok(sweets)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: SweetChanges) -> SweetResult<Option<Sweet>> {
        let result = self
            .collection
            .find_one_and_update(Self::by_id(id), Self::build_update(&changes))
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(sweet) => {
                if sweet.is_some() {
                    tracing::info!(sweet_id = %id, "Sweet updated successfully");
                }
                Ok(sweet)
            }
            Err(e) if is_duplicate_key_error(&e) => Err(SweetError::DuplicateName(
                changes.name.unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        let deleted = self.collection.find_one_and_delete(Self::by_id(id)).await?;
        if deleted.is_some() {
            tracing::info!(sweet_id = %id, "Sweet deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn purchase(&self, id: Uuid) -> SweetResult<Sweet> {
        // Conditional decrement: the filter itself guarantees quantity stays >= 0
        let filter = doc! { "_id": id.to_string(), "quantity": { "$gte": 1 } };
        let update = doc! {
            "$inc": { "quantity": -1 },
            "$set": { "updated_at": Self::now() }
        };

        let purchased = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        match purchased {
            Some(sweet) => {
                tracing::info!(sweet_id = %id, remaining = sweet.quantity, "Sweet purchased");
                Ok(sweet)
            }
            None if self.exists(id).await? => Err(SweetError::OutOfStock(id)),
            None => Err(SweetError::NotFound(id)),
        }
    }

    #[instrument(skip(self))]
    async fn restock(&self, id: Uuid, amount: i64) -> SweetResult<Sweet> {
        let update = doc! {
            "$inc": { "quantity": amount },
            "$set": { "updated_at": Self::now() }
        };

        let restocked = self
            .collection
            .find_one_and_update(Self::restock_filter(id, amount), update)
            .return_document(ReturnDocument::After)
            .await?;

        match restocked {
            Some(sweet) => {
                tracing::info!(sweet_id = %id, amount, quantity = sweet.quantity, "Sweet restocked");
                Ok(sweet)
            }
            None if self.exists(id).await? => Err(SweetError::InvalidRestockAmount),
            None => Err(SweetError::NotFound(id)),
        }
    }
}
