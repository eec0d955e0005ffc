//! `act-server` binary: serves the act form over HTTP

use act_docx::{DocxTemplate, TemplateRenderer};
use act_server::{logging, router, AppState, ServerConfig};
use act_sheets::{GoogleSheetsSource, ReferenceCache, ReferenceLoader, Secrets};
use anyhow::Context;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = ServerConfig::from_env();
    logging::init(config.log_format).context("failed to install log subscriber")?;

    let secrets = Secrets::from_path(&config.secrets)
        .with_context(|| format!("failed to read secrets from {}", config.secrets.display()))?;
    let source = GoogleSheetsSource::from_secrets(secrets);
    tracing::info!("Reference spreadsheet: {}", source.spreadsheet_id());
    let cache = ReferenceCache::new(ReferenceLoader::new(Arc::new(source)), config.cache_ttl);

    match DocxTemplate::open(&config.template).and_then(|t| t.placeholders()) {
        Ok(names) => tracing::info!(
            "Template {} uses {} placeholders",
            config.template.display(),
            names.len()
        ),
        Err(e) => tracing::warn!("Template not usable yet: {}", e),
    }
    let renderer = Arc::new(TemplateRenderer::new(config.template.clone()));

    let state = AppState::new(cache, renderer, config.session_idle);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await
        .context("server failed")?;
    Ok(())
}
