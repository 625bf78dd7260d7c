//! Permission System
//!
//! Capabilities granted to a user by the server at login time. The set is
//! read-only on the client: a fresh login is the only way to pick up changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named capabilities a user can be granted
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ManageUsers,
    ManageClients,
    ManageCases,
    ManageDocuments,
    ManageInvoices,
    ViewReports,
    /// Gates the system administration area
    ManageSettings,
    ViewAllData,
    ManageFinance,
    ManageRecords,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::ManageUsers,
        Capability::ManageClients,
        Capability::ManageCases,
        Capability::ManageDocuments,
        Capability::ManageInvoices,
        Capability::ViewReports,
        Capability::ManageSettings,
        Capability::ViewAllData,
        Capability::ManageFinance,
        Capability::ManageRecords,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::ManageUsers => write!(f, "manage-users"),
            Capability::ManageClients => write!(f, "manage-clients"),
            Capability::ManageCases => write!(f, "manage-cases"),
            Capability::ManageDocuments => write!(f, "manage-documents"),
            Capability::ManageInvoices => write!(f, "manage-invoices"),
            Capability::ViewReports => write!(f, "view-reports"),
            Capability::ManageSettings => write!(f, "manage-settings"),
            Capability::ViewAllData => write!(f, "view-all-data"),
            Capability::ManageFinance => write!(f, "manage-finance"),
            Capability::ManageRecords => write!(f, "manage-records"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// Capabilities and enabled modules attached to a user.
///
/// Missing fields deserialize as "not granted", so an absent or partial
/// permission object from the server means no capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PermissionSet {
    can_manage_users: bool,
    can_manage_clients: bool,
    can_manage_cases: bool,
    can_manage_documents: bool,
    can_manage_invoices: bool,
    can_view_reports: bool,
    can_manage_settings: bool,
    can_view_all_data: bool,
    can_manage_finance: bool,
    can_manage_records: bool,
    modules: BTreeSet<String>,
}

impl PermissionSet {
    /// The empty set: no capabilities, no modules
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a set from granted capabilities and module identifiers
    pub fn from_grants<C, M, S>(capabilities: C, modules: M) -> Self
    where
        C: IntoIterator<Item = Capability>,
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            modules: modules.into_iter().map(Into::into).collect(),
            ..Self::default()
        };
        for capability in capabilities {
            *set.flag_mut(capability) = true;
        }
        set
    }

    fn flag_mut(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::ManageUsers => &mut self.can_manage_users,
            Capability::ManageClients => &mut self.can_manage_clients,
            Capability::ManageCases => &mut self.can_manage_cases,
            Capability::ManageDocuments => &mut self.can_manage_documents,
            Capability::ManageInvoices => &mut self.can_manage_invoices,
            Capability::ViewReports => &mut self.can_view_reports,
            Capability::ManageSettings => &mut self.can_manage_settings,
            Capability::ViewAllData => &mut self.can_view_all_data,
            Capability::ManageFinance => &mut self.can_manage_finance,
            Capability::ManageRecords => &mut self.can_manage_records,
        }
    }

    /// Check whether a capability is granted
    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManageClients => self.can_manage_clients,
            Capability::ManageCases => self.can_manage_cases,
            Capability::ManageDocuments => self.can_manage_documents,
            Capability::ManageInvoices => self.can_manage_invoices,
            Capability::ViewReports => self.can_view_reports,
            Capability::ManageSettings => self.can_manage_settings,
            Capability::ViewAllData => self.can_view_all_data,
            Capability::ManageFinance => self.can_manage_finance,
            Capability::ManageRecords => self.can_manage_records,
        }
    }

    /// All granted capabilities, in declaration order
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.grants(*capability))
            .collect()
    }

    /// Check whether a module is enabled for the user
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.granted().is_empty() && self.modules.is_empty()
    }

    /// Short summary for logging
    pub fn summary(&self) -> String {
        format!(
            "PermissionSet[capabilities={}, modules={}]",
            self.granted().len(),
            self.modules.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_names_round_trip() {
        for capability in Capability::ALL {
            let parsed: Capability = capability.to_string().parse().unwrap();
            assert_eq!(parsed, capability);
        }
        assert!("manage-everything".parse::<Capability>().is_err());
        assert_eq!(
            "MANAGE-SETTINGS".parse::<Capability>(),
            Ok(Capability::ManageSettings)
        );
    }

    #[test]
    fn test_default_grants_nothing() {
        let set = PermissionSet::default();
        assert!(set.is_empty());
        for capability in Capability::ALL {
            assert!(!set.grants(capability));
        }
    }

    #[test]
    fn test_from_grants() {
        let set = PermissionSet::from_grants(
            [Capability::ManageCases, Capability::ViewReports],
            ["cases", "reports"],
        );

        assert!(set.grants(Capability::ManageCases));
        assert!(set.grants(Capability::ViewReports));
        assert!(!set.grants(Capability::ManageSettings));
        assert_eq!(
            set.granted(),
            vec![Capability::ManageCases, Capability::ViewReports]
        );
        assert!(set.has_module("cases"));
        assert!(!set.has_module("finance"));
    }

    #[test]
    fn test_wire_format_partial_object() {
        let set: PermissionSet =
            serde_json::from_str(r#"{"canManageSettings": true, "modules": ["administration"]}"#)
                .unwrap();

        assert!(set.grants(Capability::ManageSettings));
        assert!(!set.grants(Capability::ManageUsers));
        assert_eq!(set.modules().collect::<Vec<_>>(), vec!["administration"]);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["canManageSettings"], true);
        assert_eq!(json["canViewAllData"], false);
    }
}
