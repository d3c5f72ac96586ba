//! Vendor model.

use serde::{Deserialize, Serialize};

use super::{require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// A supplier purchase orders are raised against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
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

impl Entity for Vendor {
    const LABEL: &'static str = "Vendor";
    const PATH: &'static str = "vendors";
    const RESOURCE: Resource = Resource::Vendors;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Vendor name")
    }
}
