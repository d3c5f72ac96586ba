//! Employee model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// A member of staff payslips are issued to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<Decimal>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Entity for Employee {
    const LABEL: &'static str = "Employee";
    const PATH: &'static str = "employees";
    const RESOURCE: Resource = Resource::Employees;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Employee name")?;
        require_non_negative(self.base_salary, "Base salary")
    }
}
