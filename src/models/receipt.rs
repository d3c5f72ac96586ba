//! Receipt model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Cheque,
}

/// Acknowledgement of a payment received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(with = "super::money")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Receipt {
    const LABEL: &'static str = "Receipt";
    const PATH: &'static str = "receipts";
    const RESOURCE: Resource = Resource::Receipts;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.receipt_number, "Receipt number")?;
        if self.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Receipt amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
