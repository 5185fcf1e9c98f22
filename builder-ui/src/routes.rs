//! HTTP route handlers for the builder API.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::Deserialize;

use builder::core::diff::{DiffReport, diff};
use builder::orchestrator::BuildRequest;
use builder::session::Session;

use crate::sse::{blocking_sink, orchestrator_for, stream_workflow};
use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/build", post(start_build))
        .route("/refine", post(start_refine))
        .route("/diff", post(compute_diff))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct BuildBody {
    idea: String,
    /// Defaults to the server config value when omitted.
    max_iterations: Option<u32>,
}

/// POST /api/build - run a full build, streaming progress events.
async fn start_build(
    State(state): State<AppState>,
    Json(body): Json<BuildBody>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    if body.idea.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "idea is required"));
    }
    let config = state.config.clone();
    Ok(stream_workflow(move |tx| {
        let request = BuildRequest {
            idea: body.idea,
            max_review_iterations: body
                .max_iterations
                .unwrap_or(config.max_review_iterations),
        };
        let orchestrator = orchestrator_for(&config);
        let mut session = Session::new();
        orchestrator.build(&mut session, &request, blocking_sink(&tx));
    }))
}

#[derive(Deserialize)]
struct RefineBody {
    markup: String,
    feedback: String,
}

/// POST /api/refine - apply one feedback round, streaming progress events.
async fn start_refine(
    State(state): State<AppState>,
    Json(body): Json<RefineBody>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    if body.markup.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "markup is required"));
    }
    if body.feedback.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "feedback is required"));
    }
    let config = state.config.clone();
    Ok(stream_workflow(move |tx| {
        let orchestrator = orchestrator_for(&config);
        let mut session = Session::new();
        orchestrator.refine(&mut session, &body.markup, &body.feedback, blocking_sink(&tx));
    }))
}

#[derive(Deserialize)]
struct DiffBody {
    old: String,
    new: String,
}

/// POST /api/diff - line diff between two document versions.
async fn compute_diff(Json(body): Json<DiffBody>) -> Json<DiffReport> {
    Json(diff(&body.old, &body.new))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use builder::io::config::BuilderConfig;

    use super::*;

    fn test_state() -> AppState {
        AppState {
            config: Arc::new(BuilderConfig::default()),
        }
    }

    #[tokio::test]
    async fn blank_idea_is_rejected() {
        let result = start_build(
            State(test_state()),
            Json(BuildBody {
                idea: "   ".to_string(),
                max_iterations: None,
            }),
        )
        .await;

        let Err((status, _)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refine_requires_markup_and_feedback() {
        let result = start_refine(
            State(test_state()),
            Json(RefineBody {
                markup: String::new(),
                feedback: "bigger button".to_string(),
            }),
        )
        .await;
        let Err((status, _)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let result = start_refine(
            State(test_state()),
            Json(RefineBody {
                markup: "<html></html>".to_string(),
                feedback: "  ".to_string(),
            }),
        )
        .await;
        let Err((status, _)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn diff_endpoint_reports_line_counts() {
        let Json(report) = compute_diff(Json(DiffBody {
            old: "a\n".to_string(),
            new: "a\nb\n".to_string(),
        }))
        .await;
        assert_eq!(report.added, 1);
        assert_eq!(report.summary, "Added 1 lines");
    }
}
