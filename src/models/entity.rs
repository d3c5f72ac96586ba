//! The generic entity contract shared by every business record kind.

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::auth::Resource;
use crate::errors::AppError;

/// A business record kind stored and served through the generic repository.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Display name used in messages, e.g. "Purchase order".
    const LABEL: &'static str;
    /// URL segment under `/api`.
    const PATH: &'static str;
    /// Permission key; also names the backing table.
    const RESOURCE: Resource;

    /// Structural checks run before the record reaches the store.
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Lower-case singular noun for error messages.
    fn noun() -> String {
        Self::LABEL.to_lowercase()
    }

    /// Lower-case plural noun for error messages.
    fn plural_noun() -> String {
        format!("{}s", Self::noun())
    }
}

/// A persisted entity: store-assigned id and timestamps around its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
    pub created_at: String,
    pub updated_at: String,
}

/// One priced line on a quotation, invoice or purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default = "default_quantity", with = "super::money")]
    pub quantity: Decimal,
    #[serde(default, with = "super::money")]
    pub unit_price: Decimal,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

pub(crate) fn require_text(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", what)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(value: Option<Decimal>, what: &str) -> Result<(), AppError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(AppError::Validation(format!(
            "{} must not be negative",
            what
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn validate_items(items: &[LineItem]) -> Result<(), AppError> {
    for (index, item) in items.iter().enumerate() {
        require_text(&item.description, &format!("Item {} description", index + 1))?;
        if item.quantity <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Item {} quantity must be positive",
                index + 1
            )));
        }
        require_non_negative(Some(item.unit_price), &format!("Item {} unit price", index + 1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_require_text() {
        assert!(require_text("Acme", "Name").is_ok());
        let err = require_text("   ", "Name").unwrap_err();
        assert_eq!(err.message(), "Name is required");
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative(None, "Total").is_ok());
        assert!(require_non_negative(Some(Decimal::ZERO), "Total").is_ok());
        assert!(require_non_negative(Some(Decimal::new(-1, 2)), "Total").is_err());
    }

    #[test]
    fn test_line_item_defaults() {
        let item: LineItem = serde_json::from_str(r#"{"description":"Oil change"}"#).unwrap();
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert!(validate_items(&[item]).is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let item: LineItem =
            serde_json::from_str(r#"{"description":"Tyre","quantity":0,"unitPrice":80}"#).unwrap();
        let err = validate_items(&[item]).unwrap_err();
        assert_eq!(err.message(), "Item 1 quantity must be positive");
    }
}
