//! Purchase order model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_text, validate_items, Entity, LineItem};
use crate::auth::Resource;
use crate::errors::AppError;

/// Lifecycle of a purchase order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Ordered,
    Received,
    Cancelled,
}

/// An order placed with a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub po_number: String,
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for PurchaseOrder {
    const LABEL: &'static str = "Purchase order";
    const PATH: &'static str = "purchase-orders";
    const RESOURCE: Resource = Resource::PurchaseOrders;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.po_number, "PO number")?;
        require_text(&self.vendor_id, "Vendor")?;
        validate_items(&self.items)?;
        require_non_negative(self.total, "Total")
    }
}
