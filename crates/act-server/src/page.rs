//! HTML rendering of the form
//!
//! Plain server-rendered markup. Pick-lists that fill other fields submit
//! the form on change so the auto-filled values show up immediately.
//! Multi-selects whose order matters submit on change as well: a browser
//! posts selected options in document order, so pick order is only known
//! from one change per request.

use crate::form::{ACTION_FIELD, GENERATE_ACTION, SHOWN_FIELD};
use act_form::fields::{
    LICENSEE_FIELD, NAME_SUFFIX, OVERSIGHT_FIELD, POSITION_SUFFIX, SELECT_SUFFIX, SYSTEMS_FIELD,
};
use act_form::{
    custom_field, defects_field, CommitteeRole, SessionInput, SignatoryResolver, TextField,
    MANUAL_ENTRY, MAX_OVERSIGHT,
};
use act_model::ReferenceSnapshot;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// Message shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Success
    Info(String),
    /// Problem with the last action, form kept
    Error(String),
}

/// Everything the form page shows
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    /// Reference data
    pub snapshot: &'a ReferenceSnapshot,
    /// Session input
    pub input: &'a SessionInput,
    /// Messages of the last action
    pub notices: &'a [Notice],
    /// Whether a generated act awaits download
    pub download: bool,
}

const STYLE: &str = "body{font-family:sans-serif;max-width:760px;margin:2em auto;padding:0 1em}\
label{display:block;margin-top:.6em}input,select,textarea{width:100%;box-sizing:border-box}\
fieldset{margin-top:1em}.row{display:flex;gap:1em}.row>div{flex:1}\
.info{background:#e6f4ea;padding:.6em}.error{background:#fdecea;padding:.6em}\
button.generate{width:100%;background-color:#28a745;color:white;padding:.8em;margin-top:1em}";

fn head(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"uk\"><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{STYLE}</style></head><body>",
        text(title)
    )
}

fn text_input(out: &mut String, label: &str, name: &str, value: &str) {
    let _ = write!(
        out,
        "<label>{}<input type=\"text\" name=\"{}\" value=\"{}\"></label>",
        text(label),
        attr(name),
        attr(value)
    );
}

fn text_area(out: &mut String, label: &str, name: &str, value: &str, rows: u8) {
    let _ = write!(
        out,
        "<label>{}<textarea name=\"{}\" rows=\"{rows}\">{}</textarea></label>",
        text(label),
        attr(name),
        text(value)
    );
}

fn option(out: &mut String, value: &str, shown: &str, selected: bool) {
    let _ = write!(
        out,
        "<option value=\"{}\"{}>{}</option>",
        attr(value),
        if selected { " selected" } else { "" },
        text(shown)
    );
}

fn field(out: &mut String, input: &SessionInput, field: TextField, label: &str) {
    if field.is_multiline() {
        text_area(out, label, &field.id(), input.text(field), 3);
    } else {
        text_input(out, label, &field.id(), input.text(field));
    }
}

fn object_section(out: &mut String, view: &PageView<'_>) {
    let input = view.input;
    out.push_str("<fieldset><legend>🏢 1. Дані об'єкта</legend>");
    field(out, input, TextField::LegalName, "Власник");
    field(out, input, TextField::LegalAddress, "Юр. адреса");
    out.push_str("<div class=\"row\"><div>");
    field(out, input, TextField::ObjectName, "Назва об'єкта");
    out.push_str("</div><div>");
    field(out, input, TextField::ObjectAddress, "Адреса об'єкта");
    out.push_str("</div></div>");
    field(out, input, TextField::ProjectInfo, "Проектні дані");

    let current = input.licensee().as_str();
    let _ = write!(
        out,
        "<label>Ліцензіат (Монтажна орг.)<select name=\"{LICENSEE_FIELD}\" onchange=\"this.form.submit()\">"
    );
    option(out, MANUAL_ENTRY, MANUAL_ENTRY, current == MANUAL_ENTRY);
    for licensee in view.snapshot.licensees() {
        let short = licensee.short_name.as_str();
        option(out, short, short, current == short);
    }
    out.push_str("</select></label>");
    field(out, input, TextField::LicenseText, "Текст ліцензії");
    out.push_str("</fieldset>");
}

fn systems_section(out: &mut String, view: &PageView<'_>) {
    let (snapshot, input) = (view.snapshot, view.input);
    out.push_str("<fieldset><legend>🛠 2. Системи</legend>");
    let _ = write!(
        out,
        "<label>Оберіть системи:<select name=\"{SYSTEMS_FIELD}\" multiple onchange=\"this.form.submit()\">"
    );
    for system in snapshot.systems() {
        option(out, system.code.as_str(), &system.name, input.is_selected(&system.code));
    }
    out.push_str("</select></label>");

    for system in snapshot.systems().filter(|s| input.is_selected(&s.code)) {
        let code = &system.code;
        let entered = input.system_input(code);
        let _ = write!(
            out,
            "<fieldset><legend>{}</legend><input type=\"hidden\" name=\"{SHOWN_FIELD}\" value=\"{}\">",
            text(&system.name),
            attr(code.as_str())
        );
        let _ = write!(
            out,
            "<label>Порушення ({})<select name=\"{}\" multiple onchange=\"this.form.submit()\">",
            text(code.as_str()),
            attr(&defects_field(code))
        );
        for defect in snapshot.defects(code) {
            let label = defect.label();
            option(out, &label, &label, entered.picks.contains(&label));
        }
        out.push_str("</select></label>");
        text_area(
            out,
            &format!("Свій текст ({code}) - кожне зауваження з нового рядка"),
            &custom_field(code),
            &entered.custom,
            3,
        );
        out.push_str("</fieldset>");
    }
    out.push_str("</fieldset>");
}

fn role_column(out: &mut String, view: &PageView<'_>, role: CommitteeRole) {
    let resolver = SignatoryResolver::new(view.snapshot);
    let fields = view.input.role(role);
    let title = role.title();
    let _ = write!(
        out,
        "<div><label>Оберіть зі списку ({title})<select name=\"{}\" onchange=\"this.form.submit()\">",
        attr(&role.field(SELECT_SUFFIX))
    );
    for choice in resolver.candidates(&role.category()) {
        let label = choice.label();
        option(out, label, label, fields.selected.as_str() == label);
    }
    out.push_str("</select></label>");
    text_input(out, &format!("Посада ({title})"), &role.field(POSITION_SUFFIX), &fields.position);
    text_input(out, &format!("ПІБ ({title})"), &role.field(NAME_SUFFIX), &fields.name);
    out.push_str("</div>");
}

fn committee_section(out: &mut String, view: &PageView<'_>) {
    let input = view.input;
    out.push_str("<fieldset><legend>✍️ 3. Комісія</legend><div class=\"row\"><div>");
    field(out, input, TextField::ClientMainPosition, "Посада (Зам)");
    field(out, input, TextField::ClientMainName, "ПІБ (Зам)");
    out.push_str("</div><div>");
    field(out, input, TextField::ClientRespPosition, "Посада (Відп)");
    field(out, input, TextField::ClientRespName, "ПІБ (Відп)");
    out.push_str("</div></div><hr><div class=\"row\">");
    for role in CommitteeRole::ALL {
        role_column(out, view, role);
    }
    out.push_str("</div><hr>");

    let _ = write!(
        out,
        "<label>ДСНС (макс {MAX_OVERSIGHT}) - пошук за прізвищем<select name=\"{OVERSIGHT_FIELD}\" multiple onchange=\"this.form.submit()\">"
    );
    for person in SignatoryResolver::new(view.snapshot).oversight_candidates() {
        let selected = input.oversight().contains(&person.label);
        option(out, &person.label, &person.label, selected);
    }
    out.push_str("</select></label></fieldset>");
}

/// Full form page
#[must_use]
pub fn render_form(view: &PageView<'_>) -> String {
    let mut out = head("Акт СПЗ");
    out.push_str("<h1>🔥 Акт Невідповідності</h1>");
    for notice in view.notices {
        let (class, message) = match notice {
            Notice::Info(m) => ("info", m),
            Notice::Error(m) => ("error", m),
        };
        let _ = write!(out, "<p class=\"{class}\">{}</p>", text(message));
    }
    if view.download {
        out.push_str("<p><a href=\"/download\">⬇️ ЗАВАНТАЖИТИ DOCX</a></p>");
    }

    out.push_str("<form method=\"post\" action=\"/\">");
    object_section(&mut out, view);
    systems_section(&mut out, view);
    committee_section(&mut out, view);
    let _ = write!(
        out,
        "<button type=\"submit\" name=\"{ACTION_FIELD}\" value=\"update\">Оновити</button>\
         <button class=\"generate\" type=\"submit\" name=\"{ACTION_FIELD}\" value=\"{GENERATE_ACTION}\">📝 СФОРМУВАТИ АКТ</button>"
    );
    out.push_str("</form></body></html>");
    out
}

/// Blocking error page shown instead of the form
#[must_use]
pub fn render_error_page(message: &str) -> String {
    let mut out = head("Акт СПЗ");
    let _ = write!(
        out,
        "<h1>🔥 Акт Невідповідності</h1><p class=\"error\">{}</p></body></html>",
        text(message)
    );
    out
}
