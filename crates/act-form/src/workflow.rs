//! Submit workflow state machine
//!
//! ```text
//! Idle -> DataLoaded -> FormFilled -> Submitted -> RenderedOk
//!                           ^             |     \-> RenderFailed
//!                           +-------------+
//! ```
//!
//! A submit with a blank object name goes straight back to `FormFilled`
//! without touching the renderer. A successful render leaves a one-shot
//! artifact behind; submitting again replaces it.

use crate::context::build_context;
use crate::error::{FormError, ValidationError};
use crate::state::SessionInput;
use act_docx::{output_filename, DocumentRenderer, RenderContext, RenderError, DOCX_MIME};
use act_model::ReferenceSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Nothing loaded yet
    Idle,
    /// Reference data available, form shown
    DataLoaded,
    /// User has edited the form
    FormFilled,
    /// Submit accepted, rendering
    Submitted,
    /// Document ready for download
    RenderedOk,
    /// Rendering failed
    RenderFailed,
}

/// Validates a workflow transition
pub fn validate_transition(from: WorkflowState, to: WorkflowState) -> Result<(), FormError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(FormError::IllegalTransition { from, to })
    }
}

/// States reachable in one step
#[must_use]
pub fn allowed_transitions(from: WorkflowState) -> Vec<WorkflowState> {
    use WorkflowState::*;
    match from {
        Idle => vec![DataLoaded],
        DataLoaded => vec![FormFilled],
        FormFilled => vec![FormFilled, Submitted],
        Submitted => vec![RenderedOk, RenderFailed, FormFilled],
        RenderedOk | RenderFailed => vec![FormFilled, Submitted],
    }
}

/// Generated document awaiting download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Download filename
    pub filename: String,
    /// MIME type
    pub mime: &'static str,
    /// Document bytes
    pub bytes: Vec<u8>,
}

/// Workflow of one session
#[derive(Debug, Clone)]
pub struct Workflow {
    state: WorkflowState,
    artifact: Option<Artifact>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    /// Workflow in `Idle`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
            artifact: None,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Whether a document is waiting for download
    #[inline]
    #[must_use]
    pub fn has_artifact(&self) -> bool {
        self.artifact.is_some()
    }

    fn transition(&mut self, to: WorkflowState) -> Result<(), FormError> {
        validate_transition(self.state, to)?;
        tracing::debug!("Workflow {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Record that reference data is available; no-op once past `Idle`
    pub fn data_loaded(&mut self) -> Result<(), FormError> {
        if self.state == WorkflowState::Idle {
            self.transition(WorkflowState::DataLoaded)?;
        }
        Ok(())
    }

    /// Record a form edit
    pub fn edited(&mut self) -> Result<(), FormError> {
        self.data_loaded()?;
        self.transition(WorkflowState::FormFilled)
    }

    /// Validate, build the context and render
    ///
    /// # Errors
    /// - `Validation` when the object name is blank; the renderer is not called
    /// - `Render` when the renderer fails; no artifact is kept
    pub fn submit(
        &mut self,
        input: &SessionInput,
        snapshot: &ReferenceSnapshot,
        renderer: &dyn DocumentRenderer,
        today: NaiveDate,
    ) -> Result<&Artifact, FormError> {
        let context = self.begin_submit(input, snapshot)?;
        let rendered = renderer.render(&context);
        self.finish_submit(rendered, input.object_name(), today)
    }

    /// Validate and move to `Submitted`, returning the context to render
    ///
    /// Rendering happens outside the workflow; its result goes to
    /// [`Workflow::finish_submit`]. Any previous artifact is dropped.
    ///
    /// # Errors
    /// `Validation` when the object name is blank; the state returns to
    /// `FormFilled`.
    pub fn begin_submit(
        &mut self,
        input: &SessionInput,
        snapshot: &ReferenceSnapshot,
    ) -> Result<RenderContext, FormError> {
        if matches!(self.state, WorkflowState::Idle | WorkflowState::DataLoaded) {
            self.edited()?;
        }

        if input.object_name().trim().is_empty() {
            if self.state != WorkflowState::FormFilled {
                self.transition(WorkflowState::FormFilled)?;
            }
            tracing::info!("Submit rejected: object name is empty");
            return Err(ValidationError::MissingObjectName.into());
        }

        self.transition(WorkflowState::Submitted)?;
        self.artifact = None;
        Ok(build_context(input, snapshot))
    }

    /// Record the outcome of rendering a submitted form
    ///
    /// # Errors
    /// - `Render` when rendering failed; no artifact is kept
    /// - `IllegalTransition` when the form was edited since
    ///   [`Workflow::begin_submit`]; the document is discarded
    pub fn finish_submit(
        &mut self,
        rendered: Result<Vec<u8>, RenderError>,
        object_name: &str,
        today: NaiveDate,
    ) -> Result<&Artifact, FormError> {
        match rendered {
            Ok(bytes) => {
                self.transition(WorkflowState::RenderedOk)?;
                let artifact = Artifact {
                    filename: output_filename(today),
                    mime: DOCX_MIME,
                    bytes,
                };
                tracing::info!(
                    "Act generated for '{}': {} ({} bytes)",
                    object_name.trim(),
                    artifact.filename,
                    artifact.bytes.len()
                );
                Ok(&*self.artifact.insert(artifact))
            }
            Err(e) => {
                self.transition(WorkflowState::RenderFailed)?;
                tracing::error!("Act generation failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Take the generated document; later calls return `None` until the
    /// next successful submit
    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TextField;
    use crate::state::{apply, FormEvent};
    use act_docx::TemplateValue;
    use act_model::{System, SystemCode};
    use mockall::mock;
    use mockall::predicate::always;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    mock! {
        Renderer {}
        impl DocumentRenderer for Renderer {
            fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError>;
        }
    }

    fn snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot::builder()
            .system(System::new("Fire alarm", SystemCode::parse("FIRE").unwrap()))
            .build()
    }

    fn named(snapshot: &ReferenceSnapshot, name: &str) -> SessionInput {
        apply(
            SessionInput::new(snapshot),
            FormEvent::TextChanged {
                field: TextField::ObjectName,
                value: name.to_string(),
            },
            snapshot,
        )
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    #[test]
    fn blank_object_name_never_renders() {
        let snapshot = snapshot();
        let mut renderer = MockRenderer::new();
        renderer.expect_render().times(0);

        let mut workflow = Workflow::new();
        for name in ["", "   "] {
            let err = workflow
                .submit(&named(&snapshot, name), &snapshot, &renderer, today())
                .unwrap_err();
            assert!(matches!(err, FormError::Validation(ValidationError::MissingObjectName)));
            assert_eq!(workflow.state(), WorkflowState::FormFilled);
        }
        assert!(workflow.take_artifact().is_none());
    }

    #[test]
    fn successful_submit_yields_one_shot_artifact() {
        let snapshot = snapshot();
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|ctx| {
                ctx.get("OBJECT") == Some(&TemplateValue::Text("School".into()))
                    && ctx.get("FIRE") == Some(&TemplateValue::Text("—".into()))
            })
            .times(1)
            .returning(|_| Ok(b"docx".to_vec()));

        let mut workflow = Workflow::new();
        let artifact = workflow
            .submit(&named(&snapshot, "School"), &snapshot, &renderer, today())
            .unwrap();
        assert_eq!(artifact.filename, "Act_2026-10-15.docx");
        assert_eq!(artifact.mime, DOCX_MIME);
        assert_eq!(workflow.state(), WorkflowState::RenderedOk);

        assert_eq!(workflow.take_artifact().map(|a| a.bytes), Some(b"docx".to_vec()));
        assert!(workflow.take_artifact().is_none());
    }

    #[test]
    fn resubmit_regenerates() {
        let snapshot = snapshot();
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .with(always())
            .times(2)
            .returning(|_| Ok(vec![1, 2, 3]));

        let input = named(&snapshot, "School");
        let mut workflow = Workflow::new();
        workflow.submit(&input, &snapshot, &renderer, today()).unwrap();
        let _ = workflow.take_artifact();
        workflow.submit(&input, &snapshot, &renderer, today()).unwrap();
        assert_eq!(workflow.take_artifact().map(|a| a.bytes), Some(vec![1, 2, 3]));
    }

    #[test]
    fn render_failure_keeps_no_artifact() {
        let snapshot = snapshot();
        let mut ok = MockRenderer::new();
        ok.expect_render().returning(|_| Ok(vec![1]));
        let mut failing = MockRenderer::new();
        failing
            .expect_render()
            .times(1)
            .returning(|_| Err(RenderError::Malformed("missing word/document.xml".into())));

        let input = named(&snapshot, "School");
        let mut workflow = Workflow::new();
        workflow.submit(&input, &snapshot, &ok, today()).unwrap();
        let err = workflow
            .submit(&input, &snapshot, &failing, today())
            .unwrap_err();

        assert!(matches!(err, FormError::Render(RenderError::Malformed(_))));
        assert_eq!(workflow.state(), WorkflowState::RenderFailed);
        assert!(workflow.take_artifact().is_none());
    }

    #[test]
    fn edit_during_render_discards_document() {
        let snapshot = snapshot();
        let input = named(&snapshot, "School");
        let mut workflow = Workflow::new();

        let context = workflow.begin_submit(&input, &snapshot).unwrap();
        assert_eq!(context.get("OBJECT"), Some(&TemplateValue::Text("School".into())));
        assert_eq!(workflow.state(), WorkflowState::Submitted);

        workflow.edited().unwrap();
        let err = workflow
            .finish_submit(Ok(vec![1]), input.object_name(), today())
            .unwrap_err();
        assert!(matches!(
            err,
            FormError::IllegalTransition {
                from: WorkflowState::FormFilled,
                to: WorkflowState::RenderedOk
            }
        ));
        assert_eq!(workflow.state(), WorkflowState::FormFilled);
        assert!(workflow.take_artifact().is_none());
    }

    #[test]
    fn transitions_follow_the_chain() {
        use WorkflowState::*;
        assert!(validate_transition(Idle, DataLoaded).is_ok());
        assert!(validate_transition(FormFilled, Submitted).is_ok());
        assert!(validate_transition(Submitted, FormFilled).is_ok());
        assert!(validate_transition(RenderedOk, Submitted).is_ok());
        assert!(matches!(
            validate_transition(Idle, Submitted),
            Err(FormError::IllegalTransition { from: Idle, to: Submitted })
        ));
        assert!(validate_transition(DataLoaded, RenderedOk).is_err());
    }

    fn any_state() -> impl Strategy<Value = WorkflowState> {
        use WorkflowState::*;
        prop_oneof![
            Just(Idle),
            Just(DataLoaded),
            Just(FormFilled),
            Just(Submitted),
            Just(RenderedOk),
            Just(RenderFailed),
        ]
    }

    proptest! {
        #[test]
        fn validate_agrees_with_allowed(from in any_state(), to in any_state()) {
            let allowed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(validate_transition(from, to).is_ok(), allowed);
        }

        #[test]
        fn nothing_returns_to_idle(from in any_state()) {
            prop_assert!(!allowed_transitions(from).contains(&WorkflowState::Idle));
        }
    }
}
