//! Signatory pick-lists

use act_model::{ReferenceSnapshot, Signatory, SignatoryCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pick-list entry that leaves the role fields free for typing
pub const MANUAL_ENTRY: &str = "Ввести вручну...";

/// Current value of a single-choice pick-list
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// Manual-entry sentinel
    #[default]
    Manual,
    /// Label of a catalog entry
    Label(String),
}

impl Selection {
    /// Parse a submitted pick-list value
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == MANUAL_ENTRY {
            Self::Manual
        } else {
            Self::Label(raw.to_string())
        }
    }

    /// Value as shown in the pick-list
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => MANUAL_ENTRY,
            Self::Label(label) => label,
        }
    }

    /// Label of a concrete choice
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Manual => None,
            Self::Label(label) => Some(label),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option of a role pick-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<'a> {
    /// Manual-entry sentinel
    Manual,
    /// Person from the roster
    Person(&'a Signatory),
}

impl<'a> Choice<'a> {
    /// Option text
    #[must_use]
    pub fn label(&self) -> &'a str {
        match self {
            Self::Manual => MANUAL_ENTRY,
            Self::Person(signatory) => &signatory.label,
        }
    }
}

/// Category-scoped signatory lookup over a snapshot
#[derive(Debug, Clone, Copy)]
pub struct SignatoryResolver<'a> {
    snapshot: &'a ReferenceSnapshot,
}

impl<'a> SignatoryResolver<'a> {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(snapshot: &'a ReferenceSnapshot) -> Self {
        Self { snapshot }
    }

    /// Pick-list options: sentinel first, then the category's roster in
    /// sheet order
    #[must_use]
    pub fn candidates(&self, category: &'a SignatoryCategory) -> Vec<Choice<'a>> {
        std::iter::once(Choice::Manual)
            .chain(self.snapshot.signatories_in(category).map(Choice::Person))
            .collect()
    }

    /// First roster entry of the category carrying `label`
    ///
    /// Labels are only unique within a category, so the same label may
    /// resolve to different people for different roles.
    #[must_use]
    pub fn resolve(&self, label: &str, category: &SignatoryCategory) -> Option<&'a Signatory> {
        self.snapshot
            .signatories()
            .iter()
            .find(|s| &s.category == category && s.label == label)
    }

    /// Oversight-body roster, no sentinel
    #[must_use]
    pub fn oversight_candidates(&self) -> Vec<&'a Signatory> {
        self.snapshot
            .signatories()
            .iter()
            .filter(|s| s.category == SignatoryCategory::OversightBody)
            .collect()
    }
}
