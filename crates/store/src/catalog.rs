//! The record store behind every catalog operation.
//!
//! One `ProductCatalog` owns the in-memory collection (a `BTreeMap` keyed by
//! id, so iteration is id-ordered and deletions never shift neighbours) and
//! the storage adapter that holds its durable bytes. Mutating operations take
//! the write guard for the whole validate → mutate → persist sequence; the
//! persistence model rewrites the full collection on every mutation, so two
//! interleaved writes would corrupt the stored blob. Read operations share
//! the read guard and never observe a half-applied mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use stockroom_core::domain::product::{Product, ProductDraft, ProductId};
use stockroom_core::domain::update::FieldUpdate;
use stockroom_core::errors::{CatalogError, DomainError};
use stockroom_core::pricing::{apply_tier, reserve, PriceQuote};
use stockroom_core::validate::{
    validate_code_unique, validate_draft, validate_expiration, validate_price,
};

use crate::storage::CatalogStorage;

pub struct ProductCatalog {
    records: RwLock<BTreeMap<i64, Product>>,
    storage: Arc<dyn CatalogStorage>,
}

impl ProductCatalog {
    /// Read the adapter's bytes and index the decoded products by id. Empty
    /// bytes are an empty catalog.
    pub async fn load(storage: Arc<dyn CatalogStorage>) -> Result<Self, CatalogError> {
        let bytes =
            storage.read().await.map_err(|error| CatalogError::Persistence(error.to_string()))?;
        let records = decode_catalog(&bytes)?
            .into_iter()
            .map(|product| (product.id.0, product))
            .collect();

        Ok(Self { records: RwLock::new(records), storage })
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Full collection in id order. An empty catalog is an empty list, not
    /// an error.
    pub async fn get_all(&self) -> Vec<Product> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.records.read().await.get(&id.0).cloned().ok_or(DomainError::NotFound.into())
    }

    /// Products priced strictly above `threshold`, possibly none.
    pub async fn find_by_price_greater_than(&self, threshold: Decimal) -> Vec<Product> {
        self.records
            .read()
            .await
            .values()
            .filter(|product| product.price > threshold)
            .cloned()
            .collect()
    }

    /// Validate against every existing code, assign the next id, append and
    /// persist. Nothing is appended when validation or persistence fails.
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut records = self.records.write().await;

        validate_draft(&draft, records.values().map(|product| product.code_value.as_str()))?;

        let id = next_id(&records);
        let product = draft.into_product(ProductId(id));
        records.insert(id, product.clone());
        self.persist(&records).await?;

        Ok(product)
    }

    /// Upsert. A known id keeps its id and has every other field replaced
    /// after full validation (uniqueness checked against all *other*
    /// records). An unknown id behaves like `create`: the caller-supplied id
    /// is advisory only and a fresh id is assigned.
    pub async fn replace(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, CatalogError> {
        let mut records = self.records.write().await;

        let assigned = if records.contains_key(&id.0) {
            validate_draft(
                &draft,
                records
                    .values()
                    .filter(|product| product.id != id)
                    .map(|product| product.code_value.as_str()),
            )?;
            id
        } else {
            validate_draft(&draft, records.values().map(|product| product.code_value.as_str()))?;
            ProductId(next_id(&records))
        };

        let product = draft.into_product(assigned);
        records.insert(assigned.0, product.clone());
        self.persist(&records).await?;

        Ok(product)
    }

    /// Apply an already-typed patch atomically: the updates land on a copy,
    /// the validator subset for the touched fields runs against that copy,
    /// and only then is the record swapped in and persisted. Any failure
    /// leaves the stored record and the durable bytes untouched.
    pub async fn merge_partial(
        &self,
        id: ProductId,
        updates: Vec<FieldUpdate>,
    ) -> Result<Product, CatalogError> {
        let mut records = self.records.write().await;
        let mut merged = records.get(&id.0).cloned().ok_or(DomainError::NotFound)?;

        let mut name_changed = false;
        let mut code_changed = false;
        let mut price_changed = false;
        let mut expiration_changed = false;

        for update in updates {
            match &update {
                FieldUpdate::Name(_) => name_changed = true,
                FieldUpdate::CodeValue(_) => code_changed = true,
                FieldUpdate::Price(_) => price_changed = true,
                FieldUpdate::Expiration(_) => expiration_changed = true,
                FieldUpdate::Quantity(_) | FieldUpdate::IsPublished(_) => {}
            }
            merged.apply(update);
        }

        if name_changed && merged.name.is_empty() {
            return Err(DomainError::invalid("name is required").into());
        }
        if code_changed {
            if merged.code_value.is_empty() {
                return Err(DomainError::invalid("code value is required").into());
            }
            validate_code_unique(
                &merged.code_value,
                records
                    .values()
                    .filter(|product| product.id != id)
                    .map(|product| product.code_value.as_str()),
            )?;
        }
        if price_changed {
            validate_price(merged.price)?;
        }
        if expiration_changed {
            validate_expiration(&merged.expiration)?;
        }

        records.insert(id.0, merged.clone());
        self.persist(&records).await?;

        Ok(merged)
    }

    /// Remove one record and persist the reduced set. Surviving ids are
    /// never renumbered.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        let mut records = self.records.write().await;

        if records.remove(&id.0).is_none() {
            return Err(DomainError::NotFound.into());
        }
        self.persist(&records).await?;

        Ok(())
    }

    /// Quote a basket of ids, reserving one unit of stock per item. An empty
    /// basket quotes the entire catalog. The first unavailable item (missing,
    /// out of stock, or unpublished) fails the whole request; reservations
    /// applied before the failure stay applied and are persisted.
    pub async fn consumer_price(&self, ids: &[ProductId]) -> Result<PriceQuote, CatalogError> {
        let mut records = self.records.write().await;

        let basket: Vec<i64> = if ids.is_empty() {
            records.keys().copied().collect()
        } else {
            ids.iter().map(|id| id.0).collect()
        };

        let mut raw_total = Decimal::ZERO;
        let mut reserved = 0usize;

        for id in basket {
            let price = records.get_mut(&id).and_then(|product| reserve(product).ok());
            match price {
                Some(price) => {
                    raw_total += price;
                    reserved += 1;
                }
                None => {
                    if reserved > 0 {
                        self.persist(&records).await?;
                    }
                    return Err(DomainError::invalid("product not available").into());
                }
            }
        }

        let total = apply_tier(raw_total, reserved);
        self.persist(&records).await?;

        Ok(PriceQuote { total, items: reserved })
    }

    /// Probe the adapter: bytes must be readable and decodable. Returns the
    /// durable product count.
    pub async fn verify_storage(&self) -> Result<usize, CatalogError> {
        let bytes = self
            .storage
            .read()
            .await
            .map_err(|error| CatalogError::Persistence(error.to_string()))?;
        Ok(decode_catalog(&bytes)?.len())
    }

    async fn persist(&self, records: &BTreeMap<i64, Product>) -> Result<(), CatalogError> {
        let products: Vec<&Product> = records.values().collect();
        let bytes = serde_json::to_vec(&products)
            .map_err(|error| CatalogError::Persistence(format!("catalog encode failed: {error}")))?;

        self.storage
            .write(&bytes)
            .await
            .map_err(|error| CatalogError::Persistence(error.to_string()))
    }
}

fn decode_catalog(bytes: &[u8]) -> Result<Vec<Product>, CatalogError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|error| CatalogError::Persistence(format!("catalog decode failed: {error}")))
}

/// Ids grow monotonically from the current maximum, so deleting records can
/// never make a later create collide with a survivor.
fn next_id(records: &BTreeMap<i64, Product>) -> i64 {
    records.keys().next_back().map_or(1, |max| max + 1)
}
