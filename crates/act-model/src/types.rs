//! Typed reference records
//!
//! Column names follow the spreadsheet layout. Where the sheet has a
//! Ukrainian header and an English alias both are accepted.

use crate::error::ModelError;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when a signatory row has neither a label nor a name
pub const UNKNOWN_SIGNATORY: &str = "Невідомо";

/// Fallback for a missing defect category or short name
pub const UNKNOWN_FIELD: &str = "?";

/// Identifier of a system
///
/// Keys the per-system defect worksheet and names the template placeholder
/// that receives the system's defect block. Any non-blank code is accepted;
/// only codes that are also placeholder names (letters, digits and `_`, not
/// starting with a digit) reach the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemCode(String);

impl SystemCode {
    /// Parse and validate a system code
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(ModelError::EmptySystemCode);
        }
        Ok(Self(code.to_string()))
    }

    /// Whether the code can name a template placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        let mut chars = self.0.chars();
        chars
            .next()
            .is_some_and(|first| first.is_alphabetic() || first == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    /// Code as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SystemCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SystemCode> for String {
    fn from(code: SystemCode) -> Self {
        code.0
    }
}

impl AsRef<str> for SystemCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Inspected system (fire alarm, smoke extraction, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    /// Display name
    pub name: String,
    /// Identifier
    pub code: SystemCode,
}

impl System {
    /// Name column aliases
    pub const NAME_COLUMNS: &'static [&'static str] = &["Назва", "Name"];
    /// Code column aliases
    pub const CODE_COLUMNS: &'static [&'static str] = &["Код", "Code"];

    /// Create a system
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, code: SystemCode) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }

    /// Read a system from a `general data` row
    ///
    /// A blank name falls back to the code.
    pub fn from_record(record: &Record) -> Result<Self, ModelError> {
        let code = SystemCode::parse(record.get_any(Self::CODE_COLUMNS).unwrap_or_default())?;
        let name = record
            .get_any(Self::NAME_COLUMNS)
            .map_or_else(|| code.to_string(), str::to_string);
        Ok(Self { name, code })
    }
}

/// Licensee boilerplate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licensee {
    /// Short label shown in the pick-list
    pub short_name: String,
    /// Full license text merged into the act
    pub full_text: String,
}

impl Licensee {
    /// Create a licensee
    #[inline]
    #[must_use]
    pub fn new(short_name: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            full_text: full_text.into(),
        }
    }

    /// Read a licensee row, full text is trimmed
    pub fn from_record(record: &Record) -> Result<Self, ModelError> {
        let short_name = record
            .get("Short Name")
            .ok_or(ModelError::MissingColumn("Short Name"))?;
        Ok(Self::new(short_name, record.get("Full Text").unwrap_or_default()))
    }
}

/// Role tag of a signatory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatoryCategory {
    /// Installation contractor
    Installer,
    /// Maintenance contractor
    Maintenance,
    /// Monitoring (observation) service
    Observer,
    /// State emergency service inspectors (`DSNS`)
    OversightBody,
    /// Any other tag, stored lowercased
    Other(String),
}

impl SignatoryCategory {
    /// Parse a category tag, case-insensitive
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let tag = raw.trim().to_lowercase();
        match tag.as_str() {
            "installer" => Self::Installer,
            "maintenance" => Self::Maintenance,
            "observer" => Self::Observer,
            "dsns" => Self::OversightBody,
            _ => Self::Other(tag),
        }
    }

    /// Tag as written in the sheet
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Installer => "Installer",
            Self::Maintenance => "Maintenance",
            Self::Observer => "Observer",
            Self::OversightBody => "DSNS",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for SignatoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Person who may sign the act
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatory {
    /// Role tag
    pub category: SignatoryCategory,
    /// Pick-list key
    pub label: String,
    /// Job title
    pub position: String,
    /// Full name
    pub name: String,
}

impl Signatory {
    /// Create a signatory, empty label falls back to the name
    #[must_use]
    pub fn new(
        category: SignatoryCategory,
        label: impl Into<String>,
        position: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let label = label.into();
        let label = if label.trim().is_empty() {
            fallback_label(&name)
        } else {
            label
        };
        Self {
            category,
            label,
            position: position.into(),
            name,
        }
    }

    /// Read a signatory row
    ///
    /// Label falls back to name, then to [`UNKNOWN_SIGNATORY`].
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self::new(
            SignatoryCategory::parse(record.get("Category").unwrap_or_default()),
            record.get("Label").unwrap_or_default(),
            record.get("Position").unwrap_or_default(),
            record.get("Name").unwrap_or_default(),
        )
    }
}

fn fallback_label(name: &str) -> String {
    if name.trim().is_empty() {
        UNKNOWN_SIGNATORY.to_string()
    } else {
        name.to_string()
    }
}

/// Catalog entry describing one kind of defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    /// Owning system
    pub system: SystemCode,
    /// Category tag (norm reference, severity, ...)
    pub category: String,
    /// Short label
    pub short_name: String,
    /// Text merged into the act
    pub full_text: String,
}

impl Defect {
    /// Create a defect
    #[must_use]
    pub fn new(
        system: SystemCode,
        category: impl Into<String>,
        short_name: impl Into<String>,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            system,
            category: category.into(),
            short_name: short_name.into(),
            full_text: full_text.into(),
        }
    }

    /// Read a defect row of a system worksheet
    ///
    /// Rows without full text are rejected; category and short name fall back
    /// to [`UNKNOWN_FIELD`]. Full text keeps its leading indentation.
    pub fn from_record(system: &SystemCode, record: &Record) -> Result<Self, ModelError> {
        let full_text = record
            .raw("Full Text")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ModelError::MissingColumn("Full Text"))?
            .trim_end();
        Ok(Self::new(
            system.clone(),
            record.get("Category").unwrap_or(UNKNOWN_FIELD),
            record.get("Short Name").unwrap_or(UNKNOWN_FIELD),
            full_text,
        ))
    }

    /// Pick-list label: `[category] short name`
    #[must_use]
    pub fn label(&self) -> String {
        format!("[{}] {}", self.category, self.short_name)
    }
}
