//! Router and handlers
//!
//! | Route            | Handler                                     |
//! |------------------|---------------------------------------------|
//! | `GET /`          | form page, 503 when reference data is down  |
//! | `POST /`         | apply form changes, generate on request     |
//! | `GET /download`  | one-shot download of the generated act      |
//! | `GET /healthz`   | liveness                                    |

use crate::error::ServerError;
use crate::form::FormSubmission;
use crate::page::{render_form, Notice, PageView};
use crate::session::{session_cookie, session_id, Session, SessionStore};
use crate::state::AppState;
use act_docx::{DocumentRenderer, RenderContext, RenderError};
use act_form::{apply, FormError, SessionInput};
use act_model::ReferenceSnapshot;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(update_form))
        .route("/download", get(download))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_response(status: StatusCode, html: String, id: Uuid, created: bool) -> Response {
    let mut response = (status, Html(html)).into_response();
    if created {
        if let Ok(cookie) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
    }
    response
}

async fn show_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let (id, created) = state.sessions.resolve(&headers);
    let snapshot = state.cache.get().await?;

    let html = state.sessions.with(id, |session| -> Result<String, FormError> {
        session.workflow.data_loaded()?;
        let download = session.workflow.has_artifact();
        let input = session
            .input
            .get_or_insert_with(|| SessionInput::new(&snapshot));
        Ok(render_form(&PageView {
            snapshot: &snapshot,
            input,
            notices: &[],
            download,
        }))
    })?;
    Ok(page_response(StatusCode::OK, html, id, created))
}

async fn update_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let (id, created) = state.sessions.resolve(&headers);
    let snapshot = state.cache.get().await?;
    let submission = FormSubmission::new(pairs);
    let today = chrono::Local::now().date_naive();

    let (status, html) = handle_submission(
        &state.sessions,
        id,
        &submission,
        &snapshot,
        Arc::clone(&state.renderer),
        today,
    )
    .await?;
    Ok(page_response(status, html, id, created))
}

/// Form changes applied to a session, with a render still to run
struct Pending {
    status: StatusCode,
    notices: Vec<Notice>,
    context: Option<RenderContext>,
}

/// Fold a posted form into the session and generate when asked
///
/// The session is locked only while events apply and while the outcome is
/// recorded; the document renders on the blocking pool in between.
async fn handle_submission(
    sessions: &SessionStore,
    id: Uuid,
    submission: &FormSubmission,
    snapshot: &ReferenceSnapshot,
    renderer: Arc<dyn DocumentRenderer>,
    today: NaiveDate,
) -> Result<(StatusCode, String), FormError> {
    let mut pending =
        sessions.with(id, |session| apply_submission(session, submission, snapshot))?;

    let rendered = match pending.context.take() {
        Some(context) => Some(render_blocking(renderer, context).await),
        None => None,
    };

    sessions.with(id, |session| {
        finish_submission(session, pending, rendered, snapshot, today)
    })
}

/// Events that fail are reported and skipped; the rest still apply.
fn apply_submission(
    session: &mut Session,
    submission: &FormSubmission,
    snapshot: &ReferenceSnapshot,
) -> Result<Pending, FormError> {
    session.workflow.edited()?;

    let mut input = session
        .input
        .take()
        .unwrap_or_else(|| SessionInput::new(snapshot));
    let mut pending = Pending {
        status: StatusCode::OK,
        notices: Vec::new(),
        context: None,
    };

    for event in submission.events(&input, snapshot) {
        match apply(input.clone(), event, snapshot) {
            Ok(next) => input = next,
            Err(e) => {
                pending.status = StatusCode::UNPROCESSABLE_ENTITY;
                pending.notices.push(Notice::Error(e.to_string()));
            }
        }
    }

    let mut failure = None;
    if submission.wants_generate() {
        match session.workflow.begin_submit(&input, snapshot) {
            Ok(context) => pending.context = Some(context),
            Err(e) if e.is_inline() => {
                pending.status = StatusCode::UNPROCESSABLE_ENTITY;
                pending.notices.push(Notice::Error(e.to_string()));
            }
            Err(e) => failure = Some(e),
        }
    }

    session.input = Some(input);
    match failure {
        Some(e) => Err(e),
        None => Ok(pending),
    }
}

async fn render_blocking(
    renderer: Arc<dyn DocumentRenderer>,
    context: RenderContext,
) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&context))
        .await
        .unwrap_or_else(|e| Err(RenderError::Output(format!("render task failed: {e}"))))
}

fn finish_submission(
    session: &mut Session,
    mut pending: Pending,
    rendered: Option<Result<Vec<u8>, RenderError>>,
    snapshot: &ReferenceSnapshot,
    today: NaiveDate,
) -> Result<(StatusCode, String), FormError> {
    let input = session
        .input
        .take()
        .unwrap_or_else(|| SessionInput::new(snapshot));

    let mut failure = None;
    if let Some(rendered) = rendered {
        match session.workflow.finish_submit(rendered, input.object_name(), today) {
            Ok(_) => pending.notices.push(Notice::Info("Документ готовий!".to_string())),
            Err(e @ FormError::Render(_)) => {
                pending.status = StatusCode::INTERNAL_SERVER_ERROR;
                pending.notices.push(Notice::Error(format!("Помилка: {e}")));
            }
            Err(FormError::IllegalTransition { .. }) => {
                tracing::info!("Form edited while rendering, document discarded");
                pending.status = StatusCode::CONFLICT;
                pending.notices.push(Notice::Error(
                    "Форму змінено під час генерації, спробуйте ще раз".to_string(),
                ));
            }
            Err(e) => failure = Some(e),
        }
    }

    let html = render_form(&PageView {
        snapshot,
        input: &input,
        notices: &pending.notices,
        download: session.workflow.has_artifact(),
    });
    session.input = Some(input);
    match failure {
        Some(e) => Err(e),
        None => Ok((pending.status, html)),
    }
}

async fn download(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let artifact = session_id(&headers).and_then(|id| state.sessions.take_artifact(id));
    let Some(artifact) = artifact else {
        return (StatusCode::NOT_FOUND, "Документ не знайдено").into_response();
    };
    tracing::info!("Serving {} ({} bytes)", artifact.filename, artifact.bytes.len());
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    (
        [
            (CONTENT_TYPE, artifact.mime.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}
