//! End-to-end submit tests: form events to generated document

use act_docx::DocxTemplate;
use act_form::{
    apply, CommitteeRole, FormError, FormEvent, Selection, SessionInput, TextField, Workflow,
    WorkflowState,
};
use act_model::ReferenceSnapshot;
use act_test_utils::{act_template, code, read_document, sample_snapshot};
use chrono::NaiveDate;

fn fill(snapshot: &ReferenceSnapshot, events: Vec<FormEvent>) -> SessionInput {
    events
        .into_iter()
        .try_fold(SessionInput::new(snapshot), |state, event| {
            apply(state, event, snapshot)
        })
        .expect("events apply")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

#[test]
fn generated_act_contains_every_section() {
    let snapshot = sample_snapshot();
    let template = DocxTemplate::from_bytes(&act_template()).unwrap();
    let input = fill(
        &snapshot,
        vec![
            FormEvent::TextChanged {
                field: TextField::ObjectName,
                value: "Школа № 5".into(),
            },
            FormEvent::LicenseeSelected(Selection::Label("Іскра".into())),
            FormEvent::DefectsPicked {
                system: code("FIRE"),
                labels: vec!["[B] y".into(), "[A] x".into()],
            },
            FormEvent::CustomDefectsChanged {
                system: code("FIRE"),
                text: "extra line\n\n".into(),
            },
            FormEvent::SignatorySelected {
                role: CommitteeRole::Installer,
                selection: Selection::Label("Петренко".into()),
            },
            FormEvent::OversightSelected(vec!["Франко".into(), "Шевченко".into()]),
        ],
    );

    let mut workflow = Workflow::new();
    let artifact = workflow
        .submit(&input, &snapshot, &template, today())
        .unwrap();
    assert_eq!(artifact.filename, "Act_2026-10-15.docx");

    let document = read_document(&artifact.bytes);
    assert!(document.contains("Школа № 5"));
    assert!(document.contains("ТОВ «Іскра», ліцензія № 123"));
    assert!(document.contains(">1. Text Y<"));
    assert!(document.contains(">2. Text X<"));
    assert!(document.contains(">3. extra line<"));
    assert!(document.contains(">—<"));
    assert!(document.contains("Інженер Петренко П.П."));
    assert!(document.contains("Директор"));

    let franko = document.find("Старший інспектор Франко І.Я.").unwrap();
    let shevchenko = document.find("Інспектор Шевченко Т.Г.").unwrap();
    assert!(franko < shevchenko);
    assert!(!document.contains("{{"));
    assert!(!document.contains("{%"));
}

#[test]
fn rejected_submit_keeps_form_state() {
    let snapshot = sample_snapshot();
    let template = DocxTemplate::from_bytes(&act_template()).unwrap();
    let input = fill(
        &snapshot,
        vec![FormEvent::CustomDefectsChanged {
            system: code("SMOKE"),
            text: "kept".into(),
        }],
    );

    let mut workflow = Workflow::new();
    let err = workflow
        .submit(&input, &snapshot, &template, today())
        .unwrap_err();
    assert!(matches!(err, FormError::Validation(_)));
    assert_eq!(workflow.state(), WorkflowState::FormFilled);
    assert_eq!(input.system_input(&code("SMOKE")).custom, "kept");
}

#[test]
fn oversight_cap_leaves_selection_alone() {
    let snapshot = sample_snapshot();
    let input = fill(
        &snapshot,
        vec![FormEvent::OversightSelected(vec!["Шевченко".into()])],
    );
    let err = apply(
        input.clone(),
        FormEvent::OversightSelected(vec![
            "Шевченко".into(),
            "Франко".into(),
            "a".into(),
            "b".into(),
        ]),
        &snapshot,
    )
    .unwrap_err();
    assert!(matches!(err, FormError::OversightLimit { .. }));
    assert_eq!(input.oversight(), ["Шевченко".to_string()]);
}
