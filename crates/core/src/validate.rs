//! Field validation for candidate and partially-updated records.
//!
//! Checks run in a fixed order and short-circuit on the first violation, so
//! the returned error always names the first broken rule. Presence of
//! `quantity` and `price` uses the zero value as the "missing" sentinel;
//! that sentinel applies to full candidates only, never to partial updates
//! (a partial update may legitimately reset quantity to zero).

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::product::ProductDraft;
use crate::errors::DomainError;

/// External expiration date format: two-digit day, two-digit month,
/// four-digit year, `/`-separated.
pub const EXPIRATION_FORMAT: &str = "%d/%m/%Y";

/// Validate a full candidate record against the set of codes already in the
/// catalog. Callers replacing an existing record must filter that record's
/// own code out of `existing_codes`.
pub fn validate_draft<'a, I>(draft: &ProductDraft, existing_codes: I) -> Result<(), DomainError>
where
    I: IntoIterator<Item = &'a str>,
{
    if draft.name.is_empty() {
        return Err(DomainError::invalid("name is required"));
    }
    if draft.quantity == 0 {
        return Err(DomainError::invalid("quantity is required"));
    }
    if draft.code_value.is_empty() {
        return Err(DomainError::invalid("code value is required"));
    }
    if draft.price.is_zero() {
        return Err(DomainError::invalid("price is required"));
    }
    validate_price(draft.price)?;
    if draft.expiration.is_empty() {
        return Err(DomainError::invalid("expiration is required"));
    }
    validate_code_unique(&draft.code_value, existing_codes)?;
    validate_expiration(&draft.expiration)?;
    Ok(())
}

pub fn validate_code_unique<'a, I>(code_value: &str, existing_codes: I) -> Result<(), DomainError>
where
    I: IntoIterator<Item = &'a str>,
{
    if existing_codes.into_iter().any(|existing| existing == code_value) {
        return Err(DomainError::invalid("code value already exists"));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), DomainError> {
    if price.is_sign_negative() {
        return Err(DomainError::invalid("price must not be negative"));
    }
    Ok(())
}

/// The shape check runs before the calendar parse so `15-12-2099` or
/// `5/1/2099` report a format error rather than a parse artifact.
pub fn validate_expiration(expiration: &str) -> Result<(), DomainError> {
    let bytes = expiration.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return Err(DomainError::invalid("invalid expiration format"));
    }

    let date = NaiveDate::parse_from_str(expiration, EXPIRATION_FORMAT)
        .map_err(|_| DomainError::invalid("invalid expiration format"))?;

    if date <= Utc::now().date_naive() {
        return Err(DomainError::invalid("expiration date must be in the future"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use super::{validate_code_unique, validate_draft, validate_expiration, validate_price};
    use crate::domain::product::ProductDraft;
    use crate::errors::DomainError;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Oil".to_string(),
            quantity: 439,
            code_value: "S82254D".to_string(),
            is_published: true,
            expiration: "15/12/2099".to_string(),
            price: Decimal::new(7142, 2),
        }
    }

    #[test]
    fn accepts_a_complete_candidate() {
        validate_draft(&draft(), []).expect("complete candidate validates");
    }

    #[test]
    fn reports_the_first_violated_rule() {
        let candidate = ProductDraft { name: String::new(), quantity: 0, ..draft() };
        let error = validate_draft(&candidate, []).expect_err("empty name fails first");
        assert_eq!(error, DomainError::invalid("name is required"));
    }

    #[test]
    fn zero_quantity_is_missing_for_a_candidate() {
        let candidate = ProductDraft { quantity: 0, ..draft() };
        let error = validate_draft(&candidate, []).expect_err("zero quantity fails");
        assert_eq!(error, DomainError::invalid("quantity is required"));
    }

    #[test]
    fn zero_price_is_missing_and_negative_price_is_rejected() {
        let candidate = ProductDraft { price: Decimal::ZERO, ..draft() };
        let error = validate_draft(&candidate, []).expect_err("zero price fails");
        assert_eq!(error, DomainError::invalid("price is required"));

        let error = validate_price(Decimal::new(-100, 2)).expect_err("negative price fails");
        assert_eq!(error, DomainError::invalid("price must not be negative"));
    }

    #[test]
    fn duplicate_code_value_is_rejected() {
        let error = validate_draft(&draft(), ["S82254D"]).expect_err("duplicate code fails");
        assert_eq!(error, DomainError::invalid("code value already exists"));

        validate_code_unique("S82254D", ["A1", "B2"]).expect("distinct codes pass");
    }

    #[test]
    fn expiration_shape_must_be_exact() {
        for bad in ["15-12-2099", "5/12/2099", "15/12/99", "2099/12/15", "15/13/2099"] {
            let error = validate_expiration(bad).expect_err("malformed expiration fails");
            assert_eq!(error, DomainError::invalid("invalid expiration format"), "input: {bad}");
        }
    }

    #[test]
    fn expiration_must_be_strictly_in_the_future() {
        let today = Utc::now().date_naive().format("%d/%m/%Y").to_string();
        let error = validate_expiration(&today).expect_err("today is not in the future");
        assert_eq!(error, DomainError::invalid("expiration date must be in the future"));

        let yesterday =
            (Utc::now().date_naive() - Duration::days(1)).format("%d/%m/%Y").to_string();
        let error = validate_expiration(&yesterday).expect_err("the past is rejected");
        assert_eq!(error, DomainError::invalid("expiration date must be in the future"));

        let tomorrow =
            (Utc::now().date_naive() + Duration::days(1)).format("%d/%m/%Y").to_string();
        validate_expiration(&tomorrow).expect("tomorrow is accepted");
    }
}
