//! Testing utilities for the act generator workspace
//!
//! Sample workbook, snapshot and document templates shared by the crate
//! test suites.

#![allow(missing_docs)]

use act_docx::MAIN_PART;
use act_model::{Defect, Licensee, ReferenceSnapshot, Signatory, SignatoryCategory, System, SystemCode};
use act_sheets::MemorySpreadsheet;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const GENERAL_TAB: &str = "ЗАГАЛЬНІ ДАНІ";
pub const LICENSEES_TAB: &str = "Ліцензіати";
pub const SIGNATORIES_TAB: &str = "Підписанти";

pub fn code(raw: &str) -> SystemCode {
    SystemCode::parse(raw).unwrap()
}

/// Workbook with two systems; `SMOKE` has no defect tab
pub fn sample_workbook() -> MemorySpreadsheet {
    MemorySpreadsheet::new()
        .with_sheet(
            GENERAL_TAB,
            vec![
                vec!["Назва", "Код"],
                vec!["Пожежна сигналізація", "FIRE"],
                vec!["Димовидалення", "SMOKE"],
                vec!["Без коду", ""],
            ],
        )
        .with_sheet(
            LICENSEES_TAB,
            vec![
                vec!["Short Name", "Full Text"],
                vec!["Іскра", "  ТОВ «Іскра», ліцензія № 123  "],
            ],
        )
        .with_sheet(
            SIGNATORIES_TAB,
            vec![
                vec!["Category", "Label", "Position", "Name"],
                vec!["Installer", "Петренко", "Інженер", "Петренко П.П."],
                vec!["maintenance", "", "Технік", "Бондар О.О."],
                vec!["Observer", "Оператор", "Оператор ПЦС", "Коваль К.К."],
                vec!["DSNS", "Шевченко", "Інспектор", "Шевченко Т.Г."],
                vec!["DSNS", "Франко", "Старший інспектор", "Франко І.Я."],
            ],
        )
        .with_sheet(
            "FIRE",
            vec![
                vec!["Category", "Short Name", "Full Text"],
                vec!["A", "x", "Text X"],
                vec!["B", "y", "Text Y"],
                vec!["C", "", ""],
            ],
        )
}

/// Snapshot equal to what [`sample_workbook`] loads into
pub fn sample_snapshot() -> ReferenceSnapshot {
    ReferenceSnapshot::builder()
        .system(System::new("Пожежна сигналізація", code("FIRE")))
        .system(System::new("Димовидалення", code("SMOKE")))
        .licensee(Licensee::new("Іскра", "ТОВ «Іскра», ліцензія № 123"))
        .signatory(Signatory::new(SignatoryCategory::Installer, "Петренко", "Інженер", "Петренко П.П."))
        .signatory(Signatory::new(SignatoryCategory::Maintenance, "", "Технік", "Бондар О.О."))
        .signatory(Signatory::new(SignatoryCategory::Observer, "Оператор", "Оператор ПЦС", "Коваль К.К."))
        .signatory(Signatory::new(SignatoryCategory::OversightBody, "Шевченко", "Інспектор", "Шевченко Т.Г."))
        .signatory(Signatory::new(SignatoryCategory::OversightBody, "Франко", "Старший інспектор", "Франко І.Я."))
        .defects(
            code("FIRE"),
            vec![
                Defect::new(code("FIRE"), "A", "x", "Text X"),
                Defect::new(code("FIRE"), "B", "y", "Text Y"),
            ],
        )
        .build()
}

/// Wrap paragraphs into a `word/document.xml` body
pub fn document_xml(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    )
}

/// Minimal package with the given main document part
pub fn docx_package(document: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let parts = [
        (
            "[Content_Types].xml",
            "<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>",
        ),
        (MAIN_PART, document),
    ];
    for (name, body) in parts {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Act template using every placeholder the form binds
pub fn act_template() -> Vec<u8> {
    docx_package(&document_xml(&[
        "{{ LEGAL }}, {{ LEGAL_ADDR }}",
        "{{ OBJECT }}, {{ ADDRESS }}",
        "{{ PROJECT }}",
        "{{ LICENSE }}",
        "{{r FIRE }}",
        "{{r SMOKE }}",
        "{{ CLIENT_MAIN_POS }} {{ CLIENT_MAIN_NAME }}",
        "{{ CLIENT_RESP_POS }} {{ CLIENT_RESP_NAME }}",
        "{{ INSTALLER_POS }} {{ INSTALLER_NAME }}",
        "{{ MAINTENANCE_POS }} {{ MAINTENANCE_NAME }}",
        "{{ OBSERVER_POS }} {{ OBSERVER_NAME }}",
        "{%p for d in dsns_list %}",
        "{{ d.pos }} {{ d.name }}",
        "{%p endfor %}",
    ]))
}

/// Main document part of a generated package
pub fn read_document(bytes: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(MAIN_PART).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}
