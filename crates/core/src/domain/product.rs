use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::update::FieldUpdate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A catalog record. `expiration` keeps the external `DD/MM/YYYY` text form;
/// the validator owns parsing and the future-date rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub code_value: String,
    pub is_published: bool,
    pub expiration: String,
    pub price: Decimal,
}

impl Product {
    /// A product can be charged and reserved only while it is published and
    /// has stock left.
    pub fn is_available(&self) -> bool {
        self.quantity > 0 && self.is_published
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Name(name) => self.name = name,
            FieldUpdate::Quantity(quantity) => self.quantity = quantity,
            FieldUpdate::CodeValue(code_value) => self.code_value = code_value,
            FieldUpdate::IsPublished(is_published) => self.is_published = is_published,
            FieldUpdate::Expiration(expiration) => self.expiration = expiration,
            FieldUpdate::Price(price) => self.price = price,
        }
    }
}

/// Candidate record for create/replace: everything but the store-assigned id.
///
/// Fields are serde-defaulted so an absent field arrives as its zero value
/// and fails validation with the field-specific message instead of a generic
/// body rejection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub code_value: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub price: Decimal,
}

impl ProductDraft {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            quantity: self.quantity,
            code_value: self.code_value,
            is_published: self.is_published,
            expiration: self.expiration,
            price: self.price,
        }
    }
}
