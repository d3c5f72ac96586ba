//! Data models for the BizDesk application.
//!
//! Field names are camelCase on the wire so the UI can use them as-is.

mod customer;
mod employee;
mod entity;
mod invoice;
mod money;
mod payslip;
mod purchase_order;
mod quotation;
mod receipt;
mod settings;
mod user;
mod vehicle;
mod vendor;

pub use customer::*;
pub use employee::*;
pub use entity::*;
pub use invoice::*;
pub use payslip::*;
pub use purchase_order::*;
pub use quotation::*;
pub use receipt::*;
pub use settings::*;
pub use user::*;
pub use vehicle::*;
pub use vendor::*;
