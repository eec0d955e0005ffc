//! Per-system defect blocks
//!
//! Catalog picks come first in the order they were picked, then every
//! non-blank line of the free text. Items are numbered from 1.

use act_docx::{RichText, TemplateValue};
use act_model::Defect;

/// Context value of a system with nothing to report
pub const NO_DEFECTS: &str = "—";

/// Numbered defect list of one system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefectBlock {
    items: Vec<String>,
}

impl DefectBlock {
    /// Block without items
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Unnumbered item texts
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Whether there is nothing to report
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Numbered lines, `1. text`
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.trim_end()))
            .collect()
    }

    /// Block as text, the dash when empty
    #[must_use]
    pub fn text(&self) -> String {
        if self.is_empty() {
            NO_DEFECTS.to_string()
        } else {
            self.lines().join("\n")
        }
    }

    /// Value bound to the system's placeholder
    #[must_use]
    pub fn into_value(self) -> TemplateValue {
        if self.is_empty() {
            TemplateValue::Text(NO_DEFECTS.to_string())
        } else {
            TemplateValue::Rich(RichText::from_lines(self.lines()))
        }
    }
}

/// Build the block of one system
///
/// `picks` are catalog labels in pick order; labels missing from `catalog`
/// (stale after a refresh) are skipped.
#[must_use]
pub fn aggregate(catalog: &[Defect], picks: &[String], custom: &str) -> DefectBlock {
    let mut items = Vec::with_capacity(picks.len());
    for pick in picks {
        match catalog.iter().find(|d| d.label() == *pick) {
            Some(defect) => items.push(defect.full_text.trim_end().to_string()),
            None => tracing::debug!("Skipping stale defect pick '{}'", pick),
        }
    }
    items.extend(
        custom
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    );
    DefectBlock { items }
}
