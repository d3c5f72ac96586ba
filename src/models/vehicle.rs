//! Vehicle model.

use serde::{Deserialize, Serialize};

use super::{require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// A customer vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub registration_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

impl Entity for Vehicle {
    const LABEL: &'static str = "Vehicle";
    const PATH: &'static str = "vehicles";
    const RESOURCE: Resource = Resource::Vehicles;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.registration_number, "Registration number")
    }
}
