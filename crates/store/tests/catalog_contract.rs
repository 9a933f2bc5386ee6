//! End-to-end contract tests for the catalog: uniqueness, date rules, patch
//! atomicity, durable round-trips, and checkout pricing with reservation.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;

use stockroom_core::domain::product::{ProductDraft, ProductId};
use stockroom_core::domain::update::parse_patch;
use stockroom_core::errors::{CatalogError, DomainError};
use stockroom_store::{
    CatalogStorage, InMemoryStorage, JsonFileStorage, ProductCatalog, StorageError,
};

fn draft(name: &str, code_value: &str, quantity: u32, price: Decimal) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        quantity,
        code_value: code_value.to_string(),
        is_published: true,
        expiration: "15/12/2099".to_string(),
        price,
    }
}

async fn catalog_with_storage() -> (ProductCatalog, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::default());
    let catalog = ProductCatalog::load(storage.clone() as Arc<dyn CatalogStorage>)
        .await
        .expect("empty storage loads");
    (catalog, storage)
}

#[tokio::test]
async fn created_product_keeps_every_submitted_field_and_gains_an_id() {
    let (catalog, _storage) = catalog_with_storage().await;

    let created = catalog
        .create(ProductDraft {
            name: "Oil".to_string(),
            quantity: 439,
            code_value: "S82254D".to_string(),
            is_published: true,
            expiration: "15/12/2099".to_string(),
            price: Decimal::new(7142, 2),
        })
        .await
        .expect("complete candidate is accepted");

    assert_eq!(created.id, ProductId(1));
    assert_eq!(created.name, "Oil");
    assert_eq!(created.quantity, 439);
    assert_eq!(created.code_value, "S82254D");
    assert!(created.is_published);
    assert_eq!(created.expiration, "15/12/2099");
    assert_eq!(created.price, Decimal::new(7142, 2));
}

#[tokio::test]
async fn duplicate_code_value_is_rejected_and_the_catalog_is_unchanged() {
    let (catalog, _storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "S82254D", 439, Decimal::new(7142, 2))).await.expect("first");

    let error = catalog
        .create(draft("Shadow Oil", "S82254D", 10, Decimal::new(100, 2)))
        .await
        .expect_err("duplicate code must fail");

    assert_eq!(error, CatalogError::from(DomainError::invalid("code value already exists")));
    assert_eq!(catalog.len().await, 1);
}

#[tokio::test]
async fn past_expiration_is_rejected_on_create_and_replace() {
    let (catalog, _storage) = catalog_with_storage().await;

    let mut candidate = draft("Oil", "A1", 10, Decimal::new(100, 2));
    candidate.expiration = "01/01/2020".to_string();
    let error = catalog.create(candidate).await.expect_err("past date fails create");
    assert_eq!(
        error,
        CatalogError::from(DomainError::invalid("expiration date must be in the future"))
    );

    let created =
        catalog.create(draft("Oil", "A1", 10, Decimal::new(100, 2))).await.expect("valid create");
    let mut replacement = draft("Oil", "A1", 10, Decimal::new(100, 2));
    replacement.expiration = "01/01/2020".to_string();
    let error =
        catalog.replace(created.id, replacement).await.expect_err("past date fails replace");
    assert_eq!(
        error,
        CatalogError::from(DomainError::invalid("expiration date must be in the future"))
    );
}

#[tokio::test]
async fn unrecognized_patch_key_changes_nothing_in_memory_or_on_disk() {
    let (catalog, storage) = catalog_with_storage().await;
    let created =
        catalog.create(draft("Oil", "A1", 10, Decimal::new(100, 2))).await.expect("create");

    let bytes_before = storage.read().await.expect("read persisted catalog");

    // The typed-patch parser rejects the whole body, so the store never sees
    // the recognized half of this patch.
    let body = json!({ "name": "Olive Oil", "stok": 3 });
    let error = parse_patch(body.as_object().expect("object body"))
        .expect_err("unknown key rejects the whole patch");
    assert_eq!(error, DomainError::invalid("unrecognized field `stok`"));

    let bytes_after = storage.read().await.expect("read persisted catalog");
    assert_eq!(bytes_before, bytes_after, "nothing may be persisted for a rejected patch");
    let current = catalog.get_by_id(created.id).await.expect("record still present");
    assert_eq!(current, created, "record must be byte-for-byte unchanged");
}

#[tokio::test]
async fn failed_validation_mid_patch_leaves_the_record_untouched() {
    let (catalog, storage) = catalog_with_storage().await;
    let created =
        catalog.create(draft("Oil", "A1", 10, Decimal::new(100, 2))).await.expect("create");
    let bytes_before = storage.read().await.expect("read persisted catalog");

    let body = json!({ "name": "Olive Oil", "expiration": "not-a-date" });
    let updates = parse_patch(body.as_object().expect("object body")).expect("typed keys parse");
    let error =
        catalog.merge_partial(created.id, updates).await.expect_err("bad expiration fails");
    assert_eq!(error, CatalogError::from(DomainError::invalid("invalid expiration format")));

    let current = catalog.get_by_id(created.id).await.expect("record still present");
    assert_eq!(current.name, "Oil", "the earlier name update must not leak through");
    assert_eq!(storage.read().await.expect("read"), bytes_before);
}

#[tokio::test]
async fn file_backed_catalog_round_trips_field_by_field() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("products.json");

    let catalog = ProductCatalog::load(Arc::new(JsonFileStorage::new(&path)))
        .await
        .expect("fresh file loads");
    catalog.create(draft("Oil", "A1", 439, Decimal::new(7142, 2))).await.expect("create");
    catalog.create(draft("Rice", "B2", 80, Decimal::new(350, 2))).await.expect("create");
    let written = catalog.get_all().await;

    let reloaded = ProductCatalog::load(Arc::new(JsonFileStorage::new(&path)))
        .await
        .expect("written file loads");

    assert_eq!(reloaded.get_all().await, written);
}

#[tokio::test]
async fn nine_available_items_summing_to_one_hundred_quote_at_121() {
    let (catalog, _storage) = catalog_with_storage().await;

    // Eight at 11.11 plus one at 11.12: raw sum exactly 100.00.
    for index in 0..8 {
        catalog
            .create(draft(&format!("Item {index}"), &format!("C{index}"), 5, Decimal::new(1111, 2)))
            .await
            .expect("create");
    }
    catalog.create(draft("Item 8", "C8", 5, Decimal::new(1112, 2))).await.expect("create");

    let ids: Vec<ProductId> = (1..=9).map(ProductId).collect();
    let quote = catalog.consumer_price(&ids).await.expect("all nine are available");

    assert_eq!(quote.items, 9);
    assert_eq!(quote.total, Decimal::new(12100, 2));
}

#[tokio::test]
async fn quote_total_is_invariant_to_basket_order() {
    let (catalog, _storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "A1", 5, Decimal::new(7142, 2))).await.expect("create");
    catalog.create(draft("Rice", "B2", 5, Decimal::new(350, 2))).await.expect("create");
    catalog.create(draft("Salt", "C3", 5, Decimal::new(199, 2))).await.expect("create");

    let forward = catalog
        .consumer_price(&[ProductId(1), ProductId(2), ProductId(3)])
        .await
        .expect("forward order");
    let backward = catalog
        .consumer_price(&[ProductId(3), ProductId(2), ProductId(1)])
        .await
        .expect("backward order");

    assert_eq!(forward.total, backward.total);
    assert_eq!(forward.items, backward.items);
}

#[tokio::test]
async fn successful_quote_reserves_exactly_one_unit_per_basket_item() {
    let (catalog, _storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "A1", 5, Decimal::new(100, 2))).await.expect("create");
    catalog.create(draft("Rice", "B2", 7, Decimal::new(200, 2))).await.expect("create");
    catalog.create(draft("Salt", "C3", 9, Decimal::new(300, 2))).await.expect("create");

    catalog.consumer_price(&[ProductId(1), ProductId(2)]).await.expect("quote succeeds");

    assert_eq!(catalog.get_by_id(ProductId(1)).await.expect("oil").quantity, 4);
    assert_eq!(catalog.get_by_id(ProductId(2)).await.expect("rice").quantity, 6);
    assert_eq!(catalog.get_by_id(ProductId(3)).await.expect("salt").quantity, 9);
}

#[tokio::test]
async fn an_empty_basket_quotes_the_whole_catalog() {
    let (catalog, _storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "A1", 5, Decimal::new(1000, 2))).await.expect("create");
    catalog.create(draft("Rice", "B2", 5, Decimal::new(2000, 2))).await.expect("create");
    catalog.create(draft("Salt", "C3", 5, Decimal::new(3000, 2))).await.expect("create");

    let quote = catalog.consumer_price(&[]).await.expect("every product is available");

    assert_eq!(quote.items, 3);
    // (10 + 20 + 30) * 1.21
    assert_eq!(quote.total, Decimal::new(7260, 2));
    assert_eq!(catalog.get_by_id(ProductId(1)).await.expect("oil").quantity, 4);
}

#[tokio::test]
async fn unavailable_item_fails_the_quote_but_keeps_earlier_reservations() {
    let (catalog, storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "A1", 5, Decimal::new(100, 2))).await.expect("create");
    catalog.create(draft("Rice", "B2", 0, Decimal::new(200, 2))).await.expect("create");

    let error = catalog
        .consumer_price(&[ProductId(1), ProductId(2)])
        .await
        .expect_err("exhausted stock fails the whole quote");
    assert_eq!(error, CatalogError::from(DomainError::invalid("product not available")));

    // The reservation applied before the failure stays applied, in memory
    // and on disk.
    assert_eq!(catalog.get_by_id(ProductId(1)).await.expect("oil").quantity, 4);
    assert_eq!(catalog.get_by_id(ProductId(2)).await.expect("rice").quantity, 0);

    let reloaded = ProductCatalog::load(storage as Arc<dyn CatalogStorage>)
        .await
        .expect("persisted bytes decode");
    assert_eq!(reloaded.get_by_id(ProductId(1)).await.expect("oil").quantity, 4);
}

#[tokio::test]
async fn missing_basket_id_counts_as_unavailable() {
    let (catalog, _storage) = catalog_with_storage().await;
    catalog.create(draft("Oil", "A1", 5, Decimal::new(100, 2))).await.expect("create");

    let error = catalog
        .consumer_price(&[ProductId(42)])
        .await
        .expect_err("unknown id cannot be charged");
    assert_eq!(error, CatalogError::from(DomainError::invalid("product not available")));
}

struct FailingStorage;

#[async_trait]
impl CatalogStorage for FailingStorage {
    async fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(Vec::new())
    }

    async fn write(&self, _bytes: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: "products.json".into(),
            source: std::io::Error::other("disk full"),
        })
    }
}

#[tokio::test]
async fn a_failed_write_surfaces_as_a_persistence_failure() {
    let catalog =
        ProductCatalog::load(Arc::new(FailingStorage)).await.expect("readable storage loads");

    let error = catalog
        .create(draft("Oil", "A1", 10, Decimal::new(100, 2)))
        .await
        .expect_err("the write failure is fatal for the request");

    assert!(matches!(error, CatalogError::Persistence(_)));
    // The in-memory mutation is not rolled back; the inconsistency is
    // reported to the caller, not hidden.
    assert_eq!(catalog.len().await, 1);
}
