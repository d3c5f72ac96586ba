//! Payslip model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_text, Entity};
use crate::auth::Resource;
use crate::errors::AppError;

/// Lifecycle of a payslip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayslipStatus {
    #[default]
    Draft,
    Issued,
    Paid,
}

/// Pay statement for one employee and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub employee_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub basic_salary: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub allowances: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub deductions: Option<Decimal>,
    #[serde(default, with = "super::money::option", skip_serializing_if = "Option::is_none")]
    pub net_pay: Option<Decimal>,
    #[serde(default)]
    pub status: PayslipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Payslip {
    const LABEL: &'static str = "Payslip";
    const PATH: &'static str = "payslips";
    const RESOURCE: Resource = Resource::Payslips;

    fn validate(&self) -> Result<(), AppError> {
        require_text(&self.employee_id, "Employee")?;
        if self.period_end < self.period_start {
            return Err(AppError::Validation(
                "Pay period end must not precede its start".to_string(),
            ));
        }
        require_non_negative(self.basic_salary, "Basic salary")?;
        require_non_negative(self.allowances, "Allowances")?;
        require_non_negative(self.deductions, "Deductions")
    }
}
