use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// One recognized partial-update assignment.
///
/// The closed variant set replaces the original field-by-field map dispatch:
/// a patch either parses into these variants in full or is rejected before
/// any record is touched.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Name(String),
    Quantity(u32),
    CodeValue(String),
    IsPublished(bool),
    Expiration(String),
    Price(Decimal),
}

impl FieldUpdate {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Quantity(_) => "quantity",
            Self::CodeValue(_) => "code_value",
            Self::IsPublished(_) => "is_published",
            Self::Expiration(_) => "expiration",
            Self::Price(_) => "price",
        }
    }

    fn from_entry(key: &str, value: &Value) -> Result<Self, DomainError> {
        match key {
            "name" => value
                .as_str()
                .map(|name| Self::Name(name.to_string()))
                .ok_or_else(|| type_mismatch(key, "a string")),
            "quantity" => value
                .as_u64()
                .and_then(|quantity| u32::try_from(quantity).ok())
                .map(Self::Quantity)
                .ok_or_else(|| type_mismatch(key, "a non-negative integer")),
            "code_value" => value
                .as_str()
                .map(|code| Self::CodeValue(code.to_string()))
                .ok_or_else(|| type_mismatch(key, "a string")),
            "is_published" => value
                .as_bool()
                .map(Self::IsPublished)
                .ok_or_else(|| type_mismatch(key, "a boolean")),
            "expiration" => value
                .as_str()
                .map(|expiration| Self::Expiration(expiration.to_string()))
                .ok_or_else(|| type_mismatch(key, "a string")),
            "price" => value
                .as_f64()
                .and_then(|price| Decimal::try_from(price).ok())
                .map(Self::Price)
                .ok_or_else(|| type_mismatch(key, "a number")),
            _ => Err(DomainError::invalid(format!("unrecognized field `{key}`"))),
        }
    }
}

/// Parse a patch body into typed updates, all-or-nothing: any unrecognized
/// key or wrongly-typed value rejects the whole patch.
pub fn parse_patch(body: &Map<String, Value>) -> Result<Vec<FieldUpdate>, DomainError> {
    let mut updates = Vec::with_capacity(body.len());
    for (key, value) in body {
        updates.push(FieldUpdate::from_entry(key, value)?);
    }
    Ok(updates)
}

fn type_mismatch(key: &str, expected: &str) -> DomainError {
    DomainError::invalid(format!("field `{key}` must be {expected}"))
}
