//! Session input and its reducer
//!
//! Every form interaction is turned into a [`FormEvent`] and folded into the
//! session's [`SessionInput`] by [`apply`]. The reducer is a pure function of
//! the current state, the event and the reference snapshot.

use crate::error::FormError;
use crate::fields::{CommitteeRole, TextField};
use crate::resolver::{Selection, SignatoryResolver};
use act_model::{ReferenceSnapshot, SignatoryCategory, SystemCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Oversight-body entries allowed on one act
pub const MAX_OVERSIGHT: usize = 3;

/// Default position of the client's director
pub const DEFAULT_MAIN_POSITION: &str = "Директор";

/// Default position of the client's fire-safety officer
pub const DEFAULT_RESP_POSITION: &str = "Відповідальний за ПБ";

/// Pick-list plus editable fields of one committee role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFields {
    /// Pick-list value
    pub selected: Selection,
    /// Position, auto-filled on selection
    pub position: String,
    /// Full name, auto-filled on selection
    pub name: String,
}

/// Defect input of one system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInput {
    /// Catalog labels in pick order
    pub picks: Vec<String>,
    /// Free text, one defect per line
    pub custom: String,
}

/// Everything the user entered in one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    texts: IndexMap<TextField, String>,
    licensee: Selection,
    systems: Vec<SystemCode>,
    defects: IndexMap<SystemCode, SystemInput>,
    roles: IndexMap<CommitteeRole, RoleFields>,
    oversight: Vec<String>,
}

impl SessionInput {
    /// Fresh input: empty fields, default client positions, every system
    /// selected and every role on manual entry
    #[must_use]
    pub fn new(snapshot: &ReferenceSnapshot) -> Self {
        let mut texts: IndexMap<TextField, String> = TextField::FIXED
            .into_iter()
            .map(|f| (f, String::new()))
            .collect();
        texts.insert(TextField::ClientMainPosition, DEFAULT_MAIN_POSITION.to_string());
        texts.insert(TextField::ClientRespPosition, DEFAULT_RESP_POSITION.to_string());

        Self {
            texts,
            licensee: Selection::Manual,
            systems: snapshot.systems().map(|s| s.code.clone()).collect(),
            defects: IndexMap::new(),
            roles: CommitteeRole::ALL
                .into_iter()
                .map(|r| (r, RoleFields::default()))
                .collect(),
            oversight: Vec::new(),
        }
    }

    /// Value of a text field
    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::RolePosition(role) => &self.role(role).position,
            TextField::RoleName(role) => &self.role(role).name,
            _ => self.texts.get(&field).map_or("", String::as_str),
        }
    }

    fn set_text(&mut self, field: TextField, value: String) {
        match field {
            TextField::RolePosition(role) => self.role_mut(role).position = value,
            TextField::RoleName(role) => self.role_mut(role).name = value,
            _ => {
                self.texts.insert(field, value);
            }
        }
    }

    /// Object name, required at submit
    #[must_use]
    pub fn object_name(&self) -> &str {
        self.text(TextField::ObjectName)
    }

    /// Licensee pick-list value
    #[inline]
    #[must_use]
    pub fn licensee(&self) -> &Selection {
        &self.licensee
    }

    /// Selected systems in selection order
    #[inline]
    #[must_use]
    pub fn systems(&self) -> &[SystemCode] {
        &self.systems
    }

    /// Whether a system is selected
    #[must_use]
    pub fn is_selected(&self, code: &SystemCode) -> bool {
        self.systems.contains(code)
    }

    /// Defect input of a system, empty when never touched
    #[must_use]
    pub fn system_input(&self, code: &SystemCode) -> SystemInput {
        self.defects.get(code).cloned().unwrap_or_default()
    }

    /// Fields of a committee role
    #[must_use]
    pub fn role(&self, role: CommitteeRole) -> &RoleFields {
        static EMPTY: RoleFields = RoleFields {
            selected: Selection::Manual,
            position: String::new(),
            name: String::new(),
        };
        self.roles.get(&role).unwrap_or(&EMPTY)
    }

    fn role_mut(&mut self, role: CommitteeRole) -> &mut RoleFields {
        self.roles.entry(role).or_default()
    }

    /// Oversight-body labels in selection order
    #[inline]
    #[must_use]
    pub fn oversight(&self) -> &[String] {
        &self.oversight
    }
}

/// One user interaction with the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A text input was edited
    TextChanged {
        /// Edited field
        field: TextField,
        /// New value
        value: String,
    },
    /// Licensee pick-list changed
    LicenseeSelected(Selection),
    /// Systems multi-select changed
    SystemsSelected(Vec<SystemCode>),
    /// Catalog multi-select of a system changed
    DefectsPicked {
        /// System
        system: SystemCode,
        /// Selected labels
        labels: Vec<String>,
    },
    /// Free text of a system changed
    CustomDefectsChanged {
        /// System
        system: SystemCode,
        /// New text
        text: String,
    },
    /// Role pick-list changed
    SignatorySelected {
        /// Role
        role: CommitteeRole,
        /// New pick-list value
        selection: Selection,
    },
    /// Oversight-body multi-select changed
    OversightSelected(Vec<String>),
}

/// Merge a submitted multi-select value into the stored one
///
/// Entries still selected keep their earlier position, new entries are
/// appended in submitted order, duplicates are dropped. Stored order thus
/// follows the order in which the user picked entries.
#[must_use]
pub fn ordered_selection<T: PartialEq + Clone>(previous: &[T], submitted: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = previous
        .iter()
        .filter(|p| submitted.contains(p))
        .cloned()
        .collect();
    for item in submitted {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

fn known_system(snapshot: &ReferenceSnapshot, code: &SystemCode) -> Result<(), FormError> {
    if snapshot.system(code).is_some() {
        Ok(())
    } else {
        Err(FormError::UnknownSystem(code.to_string()))
    }
}

/// Fold one event into the session input
///
/// # Errors
/// - `OversightLimit` when more than [`MAX_OVERSIGHT`] entries are selected
/// - `UnknownSystem` when the event names a system the snapshot lacks
///
/// On error the caller keeps the previous state.
pub fn apply(
    mut state: SessionInput,
    event: FormEvent,
    snapshot: &ReferenceSnapshot,
) -> Result<SessionInput, FormError> {
    match event {
        FormEvent::TextChanged { field, value } => state.set_text(field, value),

        FormEvent::LicenseeSelected(selection) => {
            if let Some(text) = selection.label().and_then(|l| snapshot.licensee_text(l)) {
                state.set_text(TextField::LicenseText, text.to_string());
            }
            state.licensee = selection;
        }

        FormEvent::SystemsSelected(codes) => {
            for code in &codes {
                known_system(snapshot, code)?;
            }
            state.systems = ordered_selection(&state.systems, &codes);
        }

        FormEvent::DefectsPicked { system, labels } => {
            known_system(snapshot, &system)?;
            let entry = state.defects.entry(system).or_default();
            entry.picks = ordered_selection(&entry.picks, &labels);
        }

        FormEvent::CustomDefectsChanged { system, text } => {
            known_system(snapshot, &system)?;
            state.defects.entry(system).or_default().custom = text;
        }

        FormEvent::SignatorySelected { role, selection } => {
            let resolved = selection
                .label()
                .and_then(|label| SignatoryResolver::new(snapshot).resolve(label, &role.category()));
            let fields = state.role_mut(role);
            match resolved {
                Some(person) => {
                    fields.position = person.position.clone();
                    fields.name = person.name.clone();
                }
                None if selection != Selection::Manual => {
                    tracing::debug!("No {} signatory labelled '{}', keeping fields", role, selection);
                }
                None => {}
            }
            fields.selected = selection;
        }

        FormEvent::OversightSelected(labels) => {
            let merged = ordered_selection(&state.oversight, &labels);
            if merged.len() > MAX_OVERSIGHT {
                return Err(FormError::OversightLimit {
                    max: MAX_OVERSIGHT,
                    attempted: merged.len(),
                });
            }
            state.oversight = merged;
        }
    }
    Ok(state)
}

/// Oversight labels that still resolve in the snapshot
#[must_use]
pub fn live_oversight<'a>(state: &'a SessionInput, snapshot: &ReferenceSnapshot) -> Vec<&'a str> {
    let resolver = SignatoryResolver::new(snapshot);
    state
        .oversight
        .iter()
        .map(String::as_str)
        .filter(|label| {
            resolver
                .resolve(label, &SignatoryCategory::OversightBody)
                .is_some()
        })
        .collect()
}
