//! Posted form to [`FormEvent`]s
//!
//! The browser always posts the whole form. Only fields whose value differs
//! from the session are turned into events, which gives pick-lists the
//! change semantics of an `on_change` hook: re-posting an unchanged role
//! selection does not overwrite hand-edited position and name fields.

use act_form::fields::{LICENSEE_FIELD, OVERSIGHT_FIELD, SELECT_SUFFIX, SYSTEMS_FIELD};
use act_form::{
    custom_field, defects_field, CommitteeRole, FormEvent, Selection, SessionInput, TextField,
};
use act_model::{ReferenceSnapshot, SystemCode};

/// Submit button name
pub const ACTION_FIELD: &str = "action";

/// Submit button value that generates the act
pub const GENERATE_ACTION: &str = "generate";

/// Hidden field listing systems whose defect inputs are on the page
pub const SHOWN_FIELD: &str = "shown";

/// Decoded `application/x-www-form-urlencoded` body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pairs: Vec<(String, String)>,
}

impl FormSubmission {
    /// Wrap decoded pairs
    #[must_use]
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn all(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn known_codes(&self, name: &str, snapshot: &ReferenceSnapshot) -> Vec<SystemCode> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .filter_map(|(_, v)| SystemCode::parse(v).ok())
            .filter(|code| snapshot.system(code).is_some())
            .collect()
    }

    /// Whether the generate button was pressed
    #[must_use]
    pub fn wants_generate(&self) -> bool {
        self.first(ACTION_FIELD) == Some(GENERATE_ACTION)
    }

    /// Events turning `current` into the posted form
    ///
    /// Pick-list changes come first. A role whose pick-list changed ignores
    /// its posted position and name, which still hold the previous values;
    /// the same goes for the license text when the licensee changed.
    #[must_use]
    pub fn events(&self, current: &SessionInput, snapshot: &ReferenceSnapshot) -> Vec<FormEvent> {
        let mut events = Vec::new();

        let mut licensee_changed = false;
        if let Some(raw) = self.first(LICENSEE_FIELD) {
            let selection = Selection::parse(raw);
            if &selection != current.licensee() {
                licensee_changed = true;
                events.push(FormEvent::LicenseeSelected(selection));
            }
        }

        let mut changed_roles = Vec::new();
        for role in CommitteeRole::ALL {
            let Some(raw) = self.first(&role.field(SELECT_SUFFIX)) else {
                continue;
            };
            let selection = Selection::parse(raw);
            if selection != current.role(role).selected {
                changed_roles.push(role);
                events.push(FormEvent::SignatorySelected { role, selection });
            }
        }

        let role_fields = CommitteeRole::ALL
            .into_iter()
            .flat_map(|r| [TextField::RolePosition(r), TextField::RoleName(r)]);
        for field in TextField::FIXED.into_iter().chain(role_fields) {
            let skip = match field {
                TextField::LicenseText => licensee_changed,
                TextField::RolePosition(role) | TextField::RoleName(role) => {
                    changed_roles.contains(&role)
                }
                _ => false,
            };
            if skip {
                continue;
            }
            if let Some(raw) = self.first(&field.id()) {
                let value = normalize(raw);
                if value != current.text(field) {
                    events.push(FormEvent::TextChanged { field, value });
                }
            }
        }

        events.push(FormEvent::SystemsSelected(
            self.known_codes(SYSTEMS_FIELD, snapshot),
        ));

        for system in self.known_codes(SHOWN_FIELD, snapshot) {
            let entered = current.system_input(&system);
            let labels = self.all(&defects_field(&system));
            if labels != entered.picks {
                events.push(FormEvent::DefectsPicked {
                    system: system.clone(),
                    labels,
                });
            }
            if let Some(raw) = self.first(&custom_field(&system)) {
                let text = normalize(raw);
                if text != entered.custom {
                    events.push(FormEvent::CustomDefectsChanged { system, text });
                }
            }
        }

        events.push(FormEvent::OversightSelected(self.all(OVERSIGHT_FIELD)));
        events
    }
}

fn normalize(raw: &str) -> String {
    raw.replace("\r\n", "\n")
}
