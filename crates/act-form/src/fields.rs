//! Stable form field identifiers
//!
//! Every input of the form has an identifier that survives re-renders. Role
//! fields are `{prefix}_{suffix}` (`inst_sel`, `maint_pos`, `obs_name`);
//! per-system fields are `defects_{CODE}` and `custom_{CODE}`.

use act_model::{SignatoryCategory, SystemCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selected systems multi-select
pub const SYSTEMS_FIELD: &str = "systems";

/// Oversight-body multi-select
pub const OVERSIGHT_FIELD: &str = "dsns";

/// Licensee pick-list
pub const LICENSEE_FIELD: &str = "licensee";

/// Pick-list suffix of a role
pub const SELECT_SUFFIX: &str = "sel";
/// Position suffix of a role
pub const POSITION_SUFFIX: &str = "pos";
/// Name suffix of a role
pub const NAME_SUFFIX: &str = "name";

/// Contractor role on the inspection committee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitteeRole {
    /// Installation contractor
    Installer,
    /// Maintenance contractor
    Maintenance,
    /// Monitoring service
    Observer,
}

impl CommitteeRole {
    /// All roles in form order
    pub const ALL: [Self; 3] = [Self::Installer, Self::Maintenance, Self::Observer];

    /// Field identifier prefix
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Installer => "inst",
            Self::Maintenance => "maint",
            Self::Observer => "obs",
        }
    }

    /// Signatory category the pick-list is filtered by
    #[must_use]
    pub fn category(self) -> SignatoryCategory {
        match self {
            Self::Installer => SignatoryCategory::Installer,
            Self::Maintenance => SignatoryCategory::Maintenance,
            Self::Observer => SignatoryCategory::Observer,
        }
    }

    /// Role from its field prefix
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.prefix() == prefix)
    }

    /// Identifier of one of the role's fields
    #[must_use]
    pub fn field(self, suffix: &str) -> String {
        format!("{}_{}", self.prefix(), suffix)
    }

    /// Heading shown above the role's inputs
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Installer => "Монтажник",
            Self::Maintenance => "ТО",
            Self::Observer => "Спостерігання",
        }
    }
}

impl fmt::Display for CommitteeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Single-value text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextField {
    /// Owner legal entity
    LegalName,
    /// Owner legal address
    LegalAddress,
    /// Object name, required at submit
    ObjectName,
    /// Object address
    ObjectAddress,
    /// Project description
    ProjectInfo,
    /// License boilerplate
    LicenseText,
    /// Client director position
    ClientMainPosition,
    /// Client director name
    ClientMainName,
    /// Client fire-safety officer position
    ClientRespPosition,
    /// Client fire-safety officer name
    ClientRespName,
    /// Position of a committee role
    RolePosition(CommitteeRole),
    /// Name of a committee role
    RoleName(CommitteeRole),
}

impl TextField {
    /// Object and client fields in form order
    pub const FIXED: [Self; 10] = [
        Self::LegalName,
        Self::LegalAddress,
        Self::ObjectName,
        Self::ObjectAddress,
        Self::ProjectInfo,
        Self::LicenseText,
        Self::ClientMainPosition,
        Self::ClientMainName,
        Self::ClientRespPosition,
        Self::ClientRespName,
    ];

    /// Stable identifier
    #[must_use]
    pub fn id(self) -> String {
        match self {
            Self::LegalName => "legal_name".to_string(),
            Self::LegalAddress => "legal_addr".to_string(),
            Self::ObjectName => "obj_name".to_string(),
            Self::ObjectAddress => "obj_addr".to_string(),
            Self::ProjectInfo => "project_info".to_string(),
            Self::LicenseText => "license_text".to_string(),
            Self::ClientMainPosition => "cm_pos".to_string(),
            Self::ClientMainName => "cm_name".to_string(),
            Self::ClientRespPosition => "cr_pos".to_string(),
            Self::ClientRespName => "cr_name".to_string(),
            Self::RolePosition(role) => role.field(POSITION_SUFFIX),
            Self::RoleName(role) => role.field(NAME_SUFFIX),
        }
    }

    /// Field from its identifier
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        if let Some(field) = Self::FIXED.into_iter().find(|f| f.id() == id) {
            return Some(field);
        }
        let (prefix, suffix) = id.split_once('_')?;
        let role = CommitteeRole::from_prefix(prefix)?;
        match suffix {
            POSITION_SUFFIX => Some(Self::RolePosition(role)),
            NAME_SUFFIX => Some(Self::RoleName(role)),
            _ => None,
        }
    }

    /// Multi-line input
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::ProjectInfo | Self::LicenseText)
    }
}

/// Identifier of a system's catalog multi-select
#[must_use]
pub fn defects_field(code: &SystemCode) -> String {
    format!("defects_{code}")
}

/// Identifier of a system's free-text area
#[must_use]
pub fn custom_field(code: &SystemCode) -> String {
    format!("custom_{code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn role_field_ids() {
        assert_eq!(CommitteeRole::Installer.field(SELECT_SUFFIX), "inst_sel");
        assert_eq!(CommitteeRole::Maintenance.field(POSITION_SUFFIX), "maint_pos");
        assert_eq!(CommitteeRole::Observer.field(NAME_SUFFIX), "obs_name");
    }

    #[test]
    fn text_field_ids_round_trip() {
        let mut fields = TextField::FIXED.to_vec();
        for role in CommitteeRole::ALL {
            fields.push(TextField::RolePosition(role));
            fields.push(TextField::RoleName(role));
        }
        for field in fields {
            assert_eq!(TextField::from_id(&field.id()), Some(field));
        }
        assert_eq!(TextField::from_id("inst_sel"), None);
        assert_eq!(TextField::from_id("unknown"), None);
    }

    #[test]
    fn per_system_ids() {
        let code = SystemCode::parse("FIRE").unwrap();
        assert_eq!(defects_field(&code), "defects_FIRE");
        assert_eq!(custom_field(&code), "custom_FIRE");
    }
}
