//! Render context assembly
//!
//! Placeholder names are fixed by the act template. Each system code is a
//! placeholder of its own bound to the system's defect block, and the
//! oversight-body entries go into the `dsns_list` loop.

use crate::aggregate::{aggregate, NO_DEFECTS};
use crate::fields::{CommitteeRole, TextField};
use crate::resolver::SignatoryResolver;
use crate::state::SessionInput;
use act_docx::{RecordValue, RenderContext, TemplateValue};
use act_model::{ReferenceSnapshot, SignatoryCategory};

/// List placeholder of oversight-body signatories
pub const OVERSIGHT_LIST: &str = "dsns_list";

/// Record field holding the position in list entries
pub const ENTRY_POSITION: &str = "pos";

/// Record field holding the name in list entries
pub const ENTRY_NAME: &str = "name";

/// Placeholder bound to a text field
#[must_use]
pub fn placeholder(field: TextField) -> &'static str {
    match field {
        TextField::LegalName => "LEGAL",
        TextField::LegalAddress => "LEGAL_ADDR",
        TextField::ObjectName => "OBJECT",
        TextField::ObjectAddress => "ADDRESS",
        TextField::ProjectInfo => "PROJECT",
        TextField::LicenseText => "LICENSE",
        TextField::ClientMainPosition => "CLIENT_MAIN_POS",
        TextField::ClientMainName => "CLIENT_MAIN_NAME",
        TextField::ClientRespPosition => "CLIENT_RESP_POS",
        TextField::ClientRespName => "CLIENT_RESP_NAME",
        TextField::RolePosition(CommitteeRole::Installer) => "INSTALLER_POS",
        TextField::RoleName(CommitteeRole::Installer) => "INSTALLER_NAME",
        TextField::RolePosition(CommitteeRole::Maintenance) => "MAINTENANCE_POS",
        TextField::RoleName(CommitteeRole::Maintenance) => "MAINTENANCE_NAME",
        TextField::RolePosition(CommitteeRole::Observer) => "OBSERVER_POS",
        TextField::RoleName(CommitteeRole::Observer) => "OBSERVER_NAME",
    }
}

/// Build the context handed to the renderer
///
/// Every system of the snapshot gets a value: its defect block when
/// selected and non-empty, the dash otherwise. Systems whose code cannot
/// name a placeholder are left out, as are oversight labels that no longer
/// resolve.
#[must_use]
pub fn build_context(input: &SessionInput, snapshot: &ReferenceSnapshot) -> RenderContext {
    let mut context = RenderContext::new();

    let role_fields = CommitteeRole::ALL
        .into_iter()
        .flat_map(|r| [TextField::RolePosition(r), TextField::RoleName(r)]);
    for field in TextField::FIXED.into_iter().chain(role_fields) {
        context.insert(placeholder(field), input.text(field));
    }

    for system in snapshot.systems() {
        if !system.code.is_placeholder() {
            tracing::debug!("No placeholder for system code '{}'", system.code);
            continue;
        }
        let value = if input.is_selected(&system.code) {
            let entered = input.system_input(&system.code);
            aggregate(snapshot.defects(&system.code), &entered.picks, &entered.custom).into_value()
        } else {
            TemplateValue::Text(NO_DEFECTS.to_string())
        };
        context.insert(system.code.as_str(), value);
    }

    let resolver = SignatoryResolver::new(snapshot);
    let oversight: Vec<RecordValue> = input
        .oversight()
        .iter()
        .filter_map(|label| {
            let person = resolver.resolve(label, &SignatoryCategory::OversightBody);
            if person.is_none() {
                tracing::debug!("Dropping stale oversight label '{}'", label);
            }
            person
        })
        .map(|p| {
            RecordValue::new()
                .with(ENTRY_POSITION, p.position.as_str())
                .with(ENTRY_NAME, p.name.as_str())
        })
        .collect();
    context.insert(OVERSIGHT_LIST, oversight);

    context
}
