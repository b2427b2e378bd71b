//! Web form serving single-patient predictions from a loaded model artifact.
//!
//! Routes:
//! - `GET /` empty form
//! - `POST /predict` form submission, rendered with the predicted label
//! - `GET /health` liveness check

pub mod form;
pub mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    response::Html,
    routing::{get, post},
    Router,
};
use defaulter_model::ModelArtifact;

pub use form::{PredictError, PredictForm};
pub use page::{Outcome, INPUT_ERROR};

/// Shared server state. The artifact is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub artifact: Arc<ModelArtifact>,
}

pub fn router(artifact: Arc<ModelArtifact>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(AppState { artifact })
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, artifact: Arc<ModelArtifact>) -> std::io::Result<()> {
    let app = router(artifact);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("defaulter web form listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Html<String> {
    Html(page::render(&PredictForm::default(), &Outcome::Empty))
}

async fn predict(State(state): State<AppState>, Form(form): Form<PredictForm>) -> Html<String> {
    log::debug!("Form submission: {form:?}");
    let outcome = match form.predict(&state.artifact) {
        Ok(label) => Outcome::Prediction(label),
        Err(e) => {
            log::warn!("Prediction failed: {e}");
            Outcome::Error(INPUT_ERROR.to_string())
        }
    };
    Html(page::render(&form, &outcome))
}
