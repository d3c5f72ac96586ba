//! Role based permission table.
//!
//! A static role -> resource -> action lookup. The UI uses it to decide which
//! affordances to render; the API enforces the same table when
//! `enforce_permissions` is on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user administration
    Admin,
    /// Runs the business day to day
    Manager,
    /// Money documents and payroll
    Accountant,
    /// Front desk: customers, vehicles and quotations
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Accountant => "accountant",
            Role::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "accountant" => Some(Role::Accountant),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// Everything a permission can be granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Customers,
    Vendors,
    Vehicles,
    Employees,
    Quotations,
    Invoices,
    PurchaseOrders,
    Receipts,
    Payslips,
    Settings,
    Users,
}

impl Resource {
    /// The nine business record kinds.
    pub const ENTITIES: [Resource; 9] = [
        Resource::Customers,
        Resource::Vendors,
        Resource::Vehicles,
        Resource::Employees,
        Resource::Quotations,
        Resource::Invoices,
        Resource::PurchaseOrders,
        Resource::Receipts,
        Resource::Payslips,
    ];

    pub const ALL: [Resource; 11] = [
        Resource::Customers,
        Resource::Vendors,
        Resource::Vehicles,
        Resource::Employees,
        Resource::Quotations,
        Resource::Invoices,
        Resource::PurchaseOrders,
        Resource::Receipts,
        Resource::Payslips,
        Resource::Settings,
        Resource::Users,
    ];

    /// Permission key; doubles as the table name for entity resources.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Vendors => "vendors",
            Resource::Vehicles => "vehicles",
            Resource::Employees => "employees",
            Resource::Quotations => "quotations",
            Resource::Invoices => "invoices",
            Resource::PurchaseOrders => "purchase_orders",
            Resource::Receipts => "receipts",
            Resource::Payslips => "payslips",
            Resource::Settings => "settings",
            Resource::Users => "users",
        }
    }
}

/// Operations gated by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

/// Whether `role` may perform `action` on `resource`.
pub fn allows(role: Role, resource: Resource, action: Action) -> bool {
    match action {
        Action::View => can_view(role, resource),
        Action::Create => can_create(role, resource),
        Action::Edit => can_edit(role, resource),
        Action::Delete => can_delete(role, resource),
    }
}

pub fn can_view(role: Role, resource: Resource) -> bool {
    match resource {
        Resource::Users => role == Role::Admin,
        Resource::Payslips | Resource::Employees => {
            matches!(role, Role::Admin | Role::Manager | Role::Accountant)
        }
        _ => true,
    }
}

pub fn can_edit(role: Role, resource: Resource) -> bool {
    use Resource::*;
    match role {
        Role::Admin => true,
        Role::Manager => !matches!(resource, Users),
        Role::Accountant => matches!(
            resource,
            Quotations | Invoices | PurchaseOrders | Receipts | Payslips
        ),
        Role::Staff => matches!(resource, Customers | Vehicles | Quotations),
    }
}

/// Creating is the same capability as editing.
pub fn can_create(role: Role, resource: Resource) -> bool {
    can_edit(role, resource)
}

pub fn can_delete(role: Role, resource: Resource) -> bool {
    use Resource::*;
    match role {
        Role::Admin => true,
        Role::Manager => matches!(
            resource,
            Customers | Vendors | Vehicles | Quotations | PurchaseOrders
        ),
        Role::Accountant => matches!(resource, Quotations),
        Role::Staff => false,
    }
}

/// Capability flags for one resource, as sent to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

/// The full capability map for a role, keyed by resource.
pub fn capabilities(role: Role) -> BTreeMap<&'static str, Capabilities> {
    Resource::ALL
        .iter()
        .map(|resource| {
            (
                resource.as_str(),
                Capabilities {
                    view: can_view(role, *resource),
                    create: can_create(role, *resource),
                    edit: can_edit(role, *resource),
                    delete: can_delete(role, *resource),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_do_everything() {
        for resource in Resource::ALL {
            for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
                assert!(allows(Role::Admin, resource, action), "{:?} {:?}", resource, action);
            }
        }
    }

    #[test]
    fn test_create_aliases_edit() {
        for role in [Role::Admin, Role::Manager, Role::Accountant, Role::Staff] {
            for resource in Resource::ALL {
                assert_eq!(can_create(role, resource), can_edit(role, resource));
            }
        }
    }

    #[test]
    fn test_staff_never_deletes() {
        for resource in Resource::ALL {
            assert!(!can_delete(Role::Staff, resource));
        }
        assert!(can_edit(Role::Staff, Resource::Customers));
        assert!(!can_edit(Role::Staff, Resource::Invoices));
    }

    #[test]
    fn test_only_admin_manages_users() {
        for role in [Role::Manager, Role::Accountant, Role::Staff] {
            assert!(!can_view(role, Resource::Users));
            assert!(!can_edit(role, Resource::Users));
            assert!(!can_delete(role, Resource::Users));
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Manager, Role::Accountant, Role::Staff] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_capability_map_covers_every_resource() {
        let caps = capabilities(Role::Accountant);
        assert_eq!(caps.len(), Resource::ALL.len());
        let invoices = caps["invoices"];
        assert!(invoices.edit && invoices.create && !invoices.delete);
    }
}
