//! User Identity
//!
//! The logged-in user's profile, the firm's role catalogue and partial
//! profile updates.

use super::permissions::PermissionSet;
use serde::{Deserialize, Serialize};

/// Role code as issued by the server (e.g. `SENIOR_ASSOCIATE_SHARIA`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

/// Badge tier used when rendering a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    ManagingPartner,
    Partner,
    SeniorAssociate,
    JuniorAssociate,
    LegalAssistant,
    Accountant,
    OfficeManager,
    RecordsManager,
    Counselor,
    Staff,
}

impl Role {
    /// The distinguished owner role; bypasses every permission check
    pub const OWNER: &'static str = "MANAGING_PARTNER_CEO";

    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into())
    }

    pub fn owner() -> Self {
        Self::new(Self::OWNER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable form of the raw code: underscores become spaces
    pub fn display(&self) -> String {
        self.0.replace('_', " ")
    }

    /// Catalogue label, falling back to the raw display form
    pub fn label(&self) -> String {
        self.info()
            .map(|info| info.label.to_string())
            .unwrap_or_else(|| self.display())
    }

    /// Catalogue entry for this role, if it is a known firm role
    pub fn info(&self) -> Option<&'static RoleInfo> {
        ROLE_CATALOGUE.iter().find(|info| info.code == self.0)
    }

    /// Badge tier, decided by the first matching substring
    pub fn tier(&self) -> RoleTier {
        const RULES: [(&str, RoleTier); 9] = [
            ("MANAGING_PARTNER", RoleTier::ManagingPartner),
            ("PARTNER", RoleTier::Partner),
            ("SENIOR_ASSOCIATE", RoleTier::SeniorAssociate),
            ("JUNIOR_ASSOCIATE", RoleTier::JuniorAssociate),
            ("LEGAL_ASSISTANT", RoleTier::LegalAssistant),
            ("ACCOUNTANT", RoleTier::Accountant),
            ("OFFICE_MANAGER", RoleTier::OfficeManager),
            ("RECORDS_MANAGER", RoleTier::RecordsManager),
            ("COUNSELOR", RoleTier::Counselor),
        ];

        RULES
            .iter()
            .find(|(needle, _)| self.0.contains(needle))
            .map(|(_, tier)| *tier)
            .unwrap_or(RoleTier::Staff)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Catalogue entry for a firm role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub department: &'static str,
}

/// Catalogue entry for a department
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Department {
    pub code: &'static str,
    pub label: &'static str,
}

pub const DEPARTMENTS: [Department; 7] = [
    Department { code: "EXECUTIVE", label: "Executive" },
    Department { code: "LEGAL_COMMON_LAW", label: "Legal - Common Law" },
    Department { code: "LEGAL_SHARIA", label: "Legal - Sharia" },
    Department { code: "FINANCE", label: "Finance" },
    Department { code: "ADMIN_HR", label: "Admin & HR" },
    Department { code: "RECORDS", label: "Records" },
    Department { code: "GUIDANCE_COUNSELING", label: "Guidance & Counseling" },
];

macro_rules! role {
    ($code:literal, $label:literal, $department:literal) => {
        RoleInfo {
            code: $code,
            label: $label,
            department: $department,
        }
    };
}

pub const ROLE_CATALOGUE: [RoleInfo; 26] = [
    role!("MANAGING_PARTNER_CEO", "Managing Partner & CEO", "EXECUTIVE"),
    role!("EQUITY_PARTNER_CO_OWNER", "Equity Partner & Co-Owner", "EXECUTIVE"),
    role!("HEAD_OF_BUSINESS_OPERATIONS", "Head of Business Operations", "EXECUTIVE"),
    role!("SENIOR_ASSOCIATE_COMMON_LAW", "Senior Associate (Common Law)", "LEGAL_COMMON_LAW"),
    role!("JUNIOR_ASSOCIATE_COMMON_LAW", "Junior Associate (Common Law)", "LEGAL_COMMON_LAW"),
    role!("LEGAL_ASSISTANT_COMMON_LAW", "Legal Assistant (Common Law)", "LEGAL_COMMON_LAW"),
    role!("INTERN_COMMON_LAW", "Intern (Common Law)", "LEGAL_COMMON_LAW"),
    role!("CLERK_COMMON_LAW", "Clerk (Common Law)", "LEGAL_COMMON_LAW"),
    role!("SENIOR_ASSOCIATE_SHARIA", "Senior Associate (Sharia)", "LEGAL_SHARIA"),
    role!("JUNIOR_ASSOCIATE_SHARIA", "Junior Associate (Sharia)", "LEGAL_SHARIA"),
    role!("LEGAL_ASSISTANT_SHARIA", "Legal Assistant (Sharia)", "LEGAL_SHARIA"),
    role!("INTERN_SHARIA", "Intern (Sharia)", "LEGAL_SHARIA"),
    role!("CLERK_SHARIA", "Clerk (Sharia)", "LEGAL_SHARIA"),
    role!("ACCOUNTANT", "Accountant", "FINANCE"),
    role!("ASSISTANT_ACCOUNTANT", "Assistant Accountant", "FINANCE"),
    role!("OFFICE_MANAGER", "Office Manager", "ADMIN_HR"),
    role!("MAINTENANCE_SERVICES", "Maintenance Services", "ADMIN_HR"),
    role!("FRONT_DESK", "Front Desk", "ADMIN_HR"),
    role!("CLEANER", "Cleaner", "ADMIN_HR"),
    role!("CHEF", "Chef", "ADMIN_HR"),
    role!("SECURITY", "Security", "ADMIN_HR"),
    role!("OFFICE_MESSENGER", "Office Messenger", "ADMIN_HR"),
    role!("RECORDS_MANAGER", "Records Manager", "RECORDS"),
    role!("RECORDS_ASSISTANT", "Records Assistant", "RECORDS"),
    role!("COUNSELOR", "Counselor", "GUIDANCE_COUNSELING"),
    role!("PRIVATE_SECRETARY_TO_CEO", "Private Secretary to CEO", "EXECUTIVE"),
];

/// Department label for a code, falling back to the code with spaces
pub fn department_label(code: &str) -> String {
    DEPARTMENTS
        .iter()
        .find(|department| department.code == code)
        .map(|department| department.label.to_string())
        .unwrap_or_else(|| code.replace('_', " "))
}

/// Profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub permissions: PermissionSet,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Create a profile with the required fields; everything else empty
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: impl Into<Role>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            role: role.into(),
            department: String::new(),
            position: None,
            avatar: None,
            is_active: true,
            permissions: PermissionSet::default(),
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Avatar initials from first and last name
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Secondary line under the name: position, or email when unset
    pub fn subtitle(&self) -> &str {
        self.position.as_deref().unwrap_or(&self.email)
    }

    /// Take every profile field from `fetched`, clearing optional ones it lacks.
    ///
    /// `id`, `role` and `permissions` keep their login-time values.
    pub fn refresh_from(&mut self, fetched: UserProfile) {
        let UserProfile {
            email,
            first_name,
            last_name,
            phone,
            department,
            position,
            avatar,
            is_active,
            ..
        } = fetched;

        self.email = email;
        self.first_name = first_name;
        self.last_name = last_name;
        self.phone = phone;
        self.department = department;
        self.position = position;
        self.avatar = avatar;
        self.is_active = is_active;
    }
}

/// Partial profile update for local edits.
///
/// `id`, `role` and `permissions` change only through a fresh login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `user`, leaving the rest untouched
    pub fn apply_to(self, user: &mut UserProfile) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(department) = self.department {
            user.department = department;
        }
        if let Some(position) = self.position {
            user.position = Some(position);
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}
