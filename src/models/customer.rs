//! Customer model.

use serde::{Deserialize, Serialize};

use super::{require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// A customer the business quotes, invoices and services vehicles for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Customer {
    const LABEL: &'static str = "Customer";
    const PATH: &'static str = "customers";
    const RESOURCE: Resource = Resource::Customers;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Customer name")
    }
}
