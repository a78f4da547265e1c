use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{SweetError, SweetResult};
use crate::media::{MediaStore, PendingImage};
use crate::models::{
    NewSweet, RestockRequest, SearchQuery, Sweet, SweetChanges, SweetFilter, SweetUpdate,
};
use crate::repository::SweetRepository;

/// Inventory Ledger: owns sweet records and their quantity rules
pub struct SweetService<R: SweetRepository> {
    repository: Arc<R>,
    media: Arc<dyn MediaStore>,
}

impl<R: SweetRepository> Clone for SweetService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            media: Arc::clone(&self.media),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<R: SweetRepository> SweetService<R> {
    pub fn new(repository: R, media: Arc<dyn MediaStore>) -> Self {
        Self {
            repository: Arc::new(repository),
            media,
        }
    }

    /// Add a sweet. An uploaded file wins over an `image` URL in the body.
    #[instrument(skip_all, fields(name = ?input.name))]
    pub async fn add_sweet(
        &self,
        input: NewSweet,
        image_file: Option<PendingImage>,
    ) -> SweetResult<Sweet> {
        input.validate()?;

        let (Some(name), Some(category), Some(price), Some(quantity)) = (
            non_blank(input.name),
            non_blank(input.category),
            input.price,
            input.quantity,
        ) else {
            return Err(SweetError::MissingFields);
        };

        // Fast path; the store's unique constraint still decides races
        if self.repository.get_by_name(&name).await?.is_some() {
            return Err(SweetError::DuplicateName(name));
        }

        let image = match image_file {
            Some(file) => Some(self.upload(file).await?),
            None => non_blank(input.image),
        };
        let admins = input.admins.map(|a| a.into_vec()).unwrap_or_default();

        let sweet = Sweet::new(name, category, price, quantity, image, admins);
        self.repository.create(sweet).await
    }

    pub async fn list_sweets(&self) -> SweetResult<Vec<Sweet>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn search_sweets(&self, query: SearchQuery) -> SweetResult<Vec<Sweet>> {
        let admin = query
            .admin
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| SweetError::Validation(format!("Invalid admin id '{}'", raw)))
            })
            .transpose()?;

        let filter = SweetFilter {
            name: query.name,
            category: query.category,
            min_price: query.min_price,
            max_price: query.max_price,
            sort: query.sort,
            admin,
        };
        self.repository.search(filter).await
    }

    pub async fn get_sweet(&self, id: Uuid) -> SweetResult<Sweet> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SweetError::NotFound(id))
    }

    /// Apply the provided fields. The image is uploaded only once the sweet
    /// is known to exist and the new name is free.
    #[instrument(skip(self, input, image_file))]
    pub async fn update_sweet(
        &self,
        id: Uuid,
        input: SweetUpdate,
        image_file: Option<PendingImage>,
    ) -> SweetResult<Sweet> {
        input.validate()?;

        let existing = self.get_sweet(id).await?;

        let name = input.name.map(|n| n.trim().to_string());
        if let Some(ref name) = name {
            if name.is_empty() {
                return Err(SweetError::Validation("Name cannot be empty".to_string()));
            }
            if *name != existing.name {
                if let Some(other) = self.repository.get_by_name(name).await? {
                    if other.id != id {
                        return Err(SweetError::DuplicateName(name.clone()));
                    }
                }
            }
        }

        let image = match image_file {
            Some(file) => Some(self.upload(file).await?),
            None => non_blank(input.image),
        };

        let changes = SweetChanges {
            name,
            category: non_blank(input.category),
            price: input.price,
            quantity: input.quantity,
            image,
            admins: input.admins.map(|a| a.into_vec()),
        };

        self.repository
            .update(id, changes)
            .await?
            .ok_or(SweetError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_sweet(&self, id: Uuid) -> SweetResult<Sweet> {
        self.repository
            .delete(id)
            .await?
            .ok_or(SweetError::NotFound(id))
    }

    /// Take one unit out of stock
    #[instrument(skip(self))]
    pub async fn purchase(&self, id: Uuid) -> SweetResult<Sweet> {
        self.repository.purchase(id).await
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, id: Uuid, input: RestockRequest) -> SweetResult<Sweet> {
        let amount = input
            .amount
            .filter(|amount| *amount > 0)
            .ok_or(SweetError::InvalidRestockAmount)?;

        self.repository.restock(id, amount).await
    }

    async fn upload(&self, file: PendingImage) -> SweetResult<String> {
        let url = self.media.upload(file.path()).await;
        // Dropping the spool removes the temp file
        drop(file);
        url.ok_or(SweetError::UploadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaStore;
    use crate::models::OneOrMany;
    use crate::repository::{InMemorySweetRepository, MockSweetRepository};

    fn media_ok() -> Arc<dyn MediaStore> {
        let mut media = MockMediaStore::new();
        media
            .expect_upload()
            .returning(|_| Some("https://cdn.example.com/mint.png".to_string()));
        Arc::new(media)
    }

    fn media_failing() -> Arc<dyn MediaStore> {
        let mut media = MockMediaStore::new();
        media.expect_upload().returning(|_| None);
        Arc::new(media)
    }

    fn media_unused() -> Arc<dyn MediaStore> {
        let mut media = MockMediaStore::new();
        media.expect_upload().never();
        Arc::new(media)
    }

    fn service_with(media: Arc<dyn MediaStore>) -> SweetService<InMemorySweetRepository> {
        SweetService::new(InMemorySweetRepository::new(), media)
    }

    fn new_sweet(name: &str, price: f64, quantity: i64) -> NewSweet {
        NewSweet {
            name: Some(name.into()),
            category: Some("Candy".into()),
            price: Some(price),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_requires_all_fields() {
        let service = service_with(media_unused());

        for input in [
            NewSweet {
                name: None,
                ..new_sweet("x", 1.0, 1)
            },
            NewSweet {
                category: Some("  ".into()),
                ..new_sweet("x", 1.0, 1)
            },
            NewSweet {
                price: None,
                ..new_sweet("x", 1.0, 1)
            },
            NewSweet {
                quantity: None,
                ..new_sweet("x", 1.0, 1)
            },
        ] {
            let err = service.add_sweet(input, None).await.unwrap_err();
            assert!(matches!(err, SweetError::MissingFields));
        }
    }

    #[tokio::test]
    async fn test_add_accepts_zero_price_and_quantity() {
        let service = service_with(media_unused());
        let sweet = service.add_sweet(new_sweet("Free", 0.0, 0), None).await.unwrap();
        assert_eq!(sweet.price, 0.0);
        assert_eq!(sweet.quantity, 0);
    }

    #[tokio::test]
    async fn test_add_rejects_negative_values() {
        let service = service_with(media_unused());
        let err = service
            .add_sweet(new_sweet("Neg", -1.0, 1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::Invalid(_)));

        let err = service
            .add_sweet(new_sweet("Neg", 1.0, -1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_add_duplicate_name_conflicts() {
        let service = service_with(media_unused());
        service.add_sweet(new_sweet("Mint", 1.0, 1), None).await.unwrap();

        let err = service
            .add_sweet(new_sweet("Mint", 2.0, 2), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_add_normalizes_admins() {
        let service = service_with(media_unused());
        let admin = Uuid::new_v4();

        let single = service
            .add_sweet(
                NewSweet {
                    admins: Some(OneOrMany::One(admin)),
                    ..new_sweet("One", 1.0, 1)
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(single.admins, vec![admin]);

        let none = service.add_sweet(new_sweet("None", 1.0, 1), None).await.unwrap();
        assert!(none.admins.is_empty());
    }

    #[tokio::test]
    async fn test_add_with_uploaded_image() {
        let service = service_with(media_ok());
        let file = PendingImage::spool(b"png", Some("mint.png")).await.unwrap();
        let path = file.path().to_path_buf();

        let sweet = service
            .add_sweet(new_sweet("Mint", 1.0, 1), Some(file))
            .await
            .unwrap();

        assert_eq!(sweet.image.as_deref(), Some("https://cdn.example.com/mint.png"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_upload_persists_nothing() {
        let service = service_with(media_failing());
        let file = PendingImage::spool(b"png", Some("mint.png")).await.unwrap();
        let path = file.path().to_path_buf();

        let err = service
            .add_sweet(new_sweet("Mint", 1.0, 1), Some(file))
            .await
            .unwrap_err();

        assert!(matches!(err, SweetError::UploadFailed));
        assert!(!path.exists());
        assert!(service.list_sweets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_sweet_skips_upload() {
        let service = service_with(media_unused());
        let file = PendingImage::spool(b"png", None).await.unwrap();

        let err = service
            .update_sweet(Uuid::new_v4(), SweetUpdate::default(), Some(file))
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_with_uploaded_image_replaces_image() {
        let service = service_with(media_ok());
        let created = service
            .add_sweet(
                NewSweet {
                    image: Some("https://cdn.example.com/old.png".into()),
                    ..new_sweet("Mint", 1.0, 5)
                },
                None,
            )
            .await
            .unwrap();
        let file = PendingImage::spool(b"png", Some("mint.png")).await.unwrap();
        let path = file.path().to_path_buf();

        let updated = service
            .update_sweet(created.id, SweetUpdate::default(), Some(file))
            .await
            .unwrap();

        assert_eq!(updated.image.as_deref(), Some("https://cdn.example.com/mint.png"));
        assert_eq!(updated.price, 1.0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_update_failed_upload_keeps_sweet() {
        let service = service_with(media_failing());
        let created = service
            .add_sweet(
                NewSweet {
                    image: Some("https://cdn.example.com/old.png".into()),
                    ..new_sweet("Mint", 1.0, 5)
                },
                None,
            )
            .await
            .unwrap();
        let file = PendingImage::spool(b"png", Some("mint.png")).await.unwrap();
        let path = file.path().to_path_buf();

        let err = service
            .update_sweet(
                created.id,
                SweetUpdate {
                    price: Some(9.0),
                    quantity: Some(1),
                    ..Default::default()
                },
                Some(file),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SweetError::UploadFailed));
        assert!(!path.exists());
        let stored = service.get_sweet(created.id).await.unwrap();
        assert_eq!(stored, created);
        assert_eq!(stored.image.as_deref(), Some("https://cdn.example.com/old.png"));
    }

    #[tokio::test]
    async fn test_update_applies_only_provided_fields() {
        let service = service_with(media_unused());
        let created = service.add_sweet(new_sweet("Mint", 1.0, 5), None).await.unwrap();

        let updated = service
            .update_sweet(
                created.id,
                SweetUpdate {
                    price: Some(2.0),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 2.0);
        assert_eq!(updated.name, "Mint");
        assert_eq!(updated.quantity, 5);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_name() {
        let service = service_with(media_unused());
        service.add_sweet(new_sweet("Mint", 1.0, 1), None).await.unwrap();
        let toffee = service.add_sweet(new_sweet("Toffee", 1.0, 1), None).await.unwrap();

        let err = service
            .update_sweet(
                toffee.id,
                SweetUpdate {
                    name: Some("Mint".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_quantity() {
        let service = service_with(media_unused());
        let created = service.add_sweet(new_sweet("Mint", 1.0, 1), None).await.unwrap();

        let err = service
            .update_sweet(
                created.id,
                SweetUpdate {
                    quantity: Some(-3),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_purchase_sequence_matches_stock() {
        let service = service_with(media_unused());
        let created = service.add_sweet(new_sweet("BuyMe", 1.0, 2), None).await.unwrap();

        let mut successes = 0;
        for _ in 0..5 {
            match service.purchase(created.id).await {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, SweetError::OutOfStock(_))),
            }
        }

        assert_eq!(successes, 2);
        assert_eq!(service.get_sweet(created.id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_restock_validates_amount_before_lookup() {
        let service = service_with(media_unused());

        for amount in [None, Some(0), Some(-4)] {
            let err = service
                .restock(Uuid::new_v4(), RestockRequest { amount })
                .await
                .unwrap_err();
            assert!(matches!(err, SweetError::InvalidRestockAmount));
        }

        let err = service
            .restock(Uuid::new_v4(), RestockRequest { amount: Some(3) })
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_restock_adds_exact_amount() {
        let service = service_with(media_unused());
        let created = service.add_sweet(new_sweet("Mint", 1.0, 4), None).await.unwrap();

        let restocked = service
            .restock(created.id, RestockRequest { amount: Some(7) })
            .await
            .unwrap();
        assert_eq!(restocked.quantity, 11);
    }

    #[tokio::test]
    async fn test_search_rejects_bad_admin_id() {
        let service = service_with(media_unused());
        let err = service
            .search_sweets(SearchQuery {
                admin: Some("not-a-uuid".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::Validation(_)));
    }

    #[tokio::test]
    async fn test_search_filters_by_admin() {
        let service = service_with(media_unused());
        let admin = Uuid::new_v4();
        service
            .add_sweet(
                NewSweet {
                    admins: Some(OneOrMany::Many(vec![admin])),
                    ..new_sweet("Owned", 1.0, 1)
                },
                None,
            )
            .await
            .unwrap();
        service.add_sweet(new_sweet("Other", 1.0, 1), None).await.unwrap();

        let found = service
            .search_sweets(SearchQuery {
                admin: Some(admin.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Owned");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockSweetRepository::new();
        repo.expect_delete().returning(|_| Ok(None));

        let service = SweetService::new(repo, media_unused());
        let err = service.delete_sweet(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SweetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_race_lost_at_store_is_conflict() {
        // Pre-check passes but the store reports the unique violation
        let mut repo = MockSweetRepository::new();
        repo.expect_get_by_name().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|sweet| Err(SweetError::DuplicateName(sweet.name)));

        let service = SweetService::new(repo, media_unused());
        let err = service
            .add_sweet(new_sweet("Racy", 1.0, 1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SweetError::DuplicateName(_)));
    }
}
