//! Quotation model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_text, validate_items, Entity, LineItem};
use crate::auth::Resource;
use crate::errors::AppError;

/// Lifecycle of a quotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

/// A priced offer to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub quotation_number: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: QuotationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Quotation {
    const LABEL: &'static str = "Quotation";
    const PATH: &'static str = "quotations";
    const RESOURCE: Resource = Resource::Quotations;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.quotation_number, "Quotation number")?;
        require_text(&self.customer_id, "Customer")?;
        validate_items(&self.items)?;
        require_non_negative(self.subtotal, "Subtotal")?;
        require_non_negative(self.tax, "Tax")?;
        require_non_negative(self.total, "Total")?;
        if let (Some(issued), Some(until)) = (self.issue_date, self.valid_until) {
            if until < issued {
                return Err(AppError::Validation(
                    "Valid until date must not precede the issue date".to_string(),
                ));
            }
        }
        Ok(())
    }
}
