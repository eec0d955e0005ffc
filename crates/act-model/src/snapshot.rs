//! Immutable reference snapshot
//!
//! Built once per refresh cycle and shared read-only between sessions.

use crate::types::{Defect, Licensee, Signatory, SignatoryCategory, System, SystemCode};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// All reference data loaded in one refresh cycle
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    systems: IndexMap<String, System>,
    licensees: IndexMap<String, Licensee>,
    signatories: Vec<Signatory>,
    defects: IndexMap<SystemCode, Vec<Defect>>,
    fetched_at: DateTime<Utc>,
}

impl ReferenceSnapshot {
    /// Start building a snapshot
    #[inline]
    #[must_use]
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Systems in sheet order
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    /// Number of systems
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Look a system up by code
    #[must_use]
    pub fn system(&self, code: &SystemCode) -> Option<&System> {
        self.systems.values().find(|s| &s.code == code)
    }

    /// Look a system up by display name
    #[must_use]
    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.systems.get(name)
    }

    /// Licensees in sheet order
    pub fn licensees(&self) -> impl Iterator<Item = &Licensee> {
        self.licensees.values()
    }

    /// Full license text for a short name
    #[must_use]
    pub fn licensee_text(&self, short_name: &str) -> Option<&str> {
        self.licensees
            .get(short_name)
            .map(|l| l.full_text.as_str())
    }

    /// All signatories in sheet order
    #[inline]
    #[must_use]
    pub fn signatories(&self) -> &[Signatory] {
        &self.signatories
    }

    /// Signatories of one category, in sheet order
    pub fn signatories_in<'a>(
        &'a self,
        category: &'a SignatoryCategory,
    ) -> impl Iterator<Item = &'a Signatory> + 'a {
        self.signatories
            .iter()
            .filter(move |s| &s.category == category)
    }

    /// Defect catalog of a system, empty when the system has no worksheet
    #[must_use]
    pub fn defects(&self, code: &SystemCode) -> &[Defect] {
        self.defects.get(code).map_or(&[], Vec::as_slice)
    }

    /// Find a catalog entry by its pick-list label
    #[must_use]
    pub fn defect_by_label(&self, code: &SystemCode, label: &str) -> Option<&Defect> {
        self.defects(code).iter().find(|d| d.label() == label)
    }

    /// When the snapshot was fetched
    #[inline]
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Builder for [`ReferenceSnapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    systems: IndexMap<String, System>,
    licensees: IndexMap<String, Licensee>,
    signatories: Vec<Signatory>,
    defects: IndexMap<SystemCode, Vec<Defect>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl SnapshotBuilder {
    /// Add a system
    ///
    /// A repeated name keeps its first position and takes the newer code.
    #[must_use]
    pub fn system(mut self, system: System) -> Self {
        self.systems.insert(system.name.clone(), system);
        self
    }

    /// Add a licensee, a repeated short name replaces the text
    #[must_use]
    pub fn licensee(mut self, licensee: Licensee) -> Self {
        self.licensees.insert(licensee.short_name.clone(), licensee);
        self
    }

    /// Add a signatory
    #[must_use]
    pub fn signatory(mut self, signatory: Signatory) -> Self {
        self.signatories.push(signatory);
        self
    }

    /// Set the defect catalog of a system
    ///
    /// Entries belonging to another system are dropped.
    #[must_use]
    pub fn defects(mut self, code: SystemCode, defects: Vec<Defect>) -> Self {
        let owned = defects.into_iter().filter(|d| d.system == code).collect();
        self.defects.insert(code, owned);
        self
    }

    /// Override the fetch timestamp
    #[must_use]
    pub fn fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(at);
        self
    }

    /// Finish the snapshot
    ///
    /// Every system gets a defect catalog entry, catalogs of codes that are
    /// not systems are discarded.
    #[must_use]
    pub fn build(self) -> ReferenceSnapshot {
        let Self {
            systems,
            licensees,
            signatories,
            mut defects,
            fetched_at,
        } = self;

        let defects = systems
            .values()
            .map(|s| {
                let catalog = defects.swap_remove(&s.code).unwrap_or_default();
                (s.code.clone(), catalog)
            })
            .collect();

        ReferenceSnapshot {
            systems,
            licensees,
            signatories,
            defects,
            fetched_at: fetched_at.unwrap_or_else(Utc::now),
        }
    }
}
