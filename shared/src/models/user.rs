//! User roles and profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ParseEnumError;

/// Application role carried by every profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supplier,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supplier => "supplier",
            Role::Customer => "customer",
        }
    }

    /// Admins and suppliers operate the dashboard side of the platform
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Supplier)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "supplier" => Ok(Role::Supplier),
            "customer" => Ok(Role::Customer),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// Application-level user record, separate from the login identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    /// False when the profile row is missing and this was built from the identity
    pub persisted: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Build a stand-in profile when no profile row exists yet.
    ///
    /// The full name falls back to the email and the role to the one recorded
    /// at sign-up, defaulting to customer.
    pub fn from_identity(
        id: Uuid,
        email: &str,
        metadata_full_name: Option<&str>,
        metadata_role: Option<Role>,
    ) -> Self {
        let full_name = metadata_full_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(email);

        Self {
            id,
            email: email.to_string(),
            full_name: Some(full_name.to_string()),
            company_name: None,
            role: metadata_role.unwrap_or(Role::Customer),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            persisted: false,
            created_at: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}
