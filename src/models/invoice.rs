//! Invoice model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_text, validate_items, Entity, LineItem};
use crate::auth::Resource;
use crate::errors::AppError;

/// Lifecycle of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// A bill issued to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Invoice {
    const LABEL: &'static str = "Invoice";
    const PATH: &'static str = "invoices";
    const RESOURCE: Resource = Resource::Invoices;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.invoice_number, "Invoice number")?;
        require_text(&self.customer_id, "Customer")?;
        validate_items(&self.items)?;
        require_non_negative(self.subtotal, "Subtotal")?;
        require_non_negative(self.tax, "Tax")?;
        require_non_negative(self.total, "Total")?;
        if let (Some(issued), Some(due)) = (self.issue_date, self.due_date) {
            if due < issued {
                return Err(AppError::Validation(
                    "Due date must not precede the issue date".to_string(),
                ));
            }
        }
        Ok(())
    }
}
