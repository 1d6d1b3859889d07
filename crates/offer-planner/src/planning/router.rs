use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ResponseShape;
use super::service::{OptimizeError, OptimizeOptions, OptimizeReply, OptimizeService};
use super::upstream::UpstreamReply;

/// Query-string knobs accepted by both optimize routes.
///
/// Values stay raw strings so a malformed knob is ignored instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct OptimizeParams {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<String>,
}

impl OptimizeParams {
    fn options(&self) -> OptimizeOptions {
        OptimizeOptions {
            shape: self.format.as_deref().and_then(ResponseShape::parse),
            delay: None,
        }
        .with_delay_ms(
            self.delay_ms
                .as_deref()
                .and_then(|raw| raw.trim().parse().ok()),
        )
    }
}

/// Router exposing the optimize endpoints.
pub fn optimize_router(service: Arc<OptimizeService>) -> Router {
    Router::new()
        .route("/optimize", post(optimize_handler))
        .route("/optimize/csv", post(optimize_csv_handler))
        .with_state(service)
}

pub(crate) async fn optimize_handler(
    State(service): State<Arc<OptimizeService>>,
    Query(params): Query<OptimizeParams>,
    body: Bytes,
) -> Response {
    match service.optimize(body, params.options()).await {
        Ok(OptimizeReply::Local(plan)) => (StatusCode::OK, Json(plan)).into_response(),
        Ok(OptimizeReply::Forwarded(reply)) => {
            let content_type = reply
                .content_type
                .clone()
                .unwrap_or_else(|| mime::APPLICATION_JSON.to_string());
            forwarded(reply, content_type, None)
        }
        Err(OptimizeError::Validation(messages)) => {
            let payload = json!({
                "error": "validation_failed",
                "messages": messages,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(OptimizeError::Upstream(error)) => {
            let payload = json!({
                "error": "proxy_failed",
                "message": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": "computation_failed",
                "message": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn optimize_csv_handler(
    State(service): State<Arc<OptimizeService>>,
    Query(params): Query<OptimizeParams>,
    body: Bytes,
) -> Response {
    match service.optimize_csv(body, params.options()).await {
        Ok(reply) => forwarded(
            reply,
            mime::TEXT_CSV.to_string(),
            Some("attachment; filename=\"offers.csv\""),
        ),
        Err(OptimizeError::Upstream(error)) => {
            plain_text(StatusCode::BAD_GATEWAY, error.to_string())
        }
        Err(other) => plain_text(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn forwarded(
    reply: UpstreamReply,
    content_type: String,
    disposition: Option<&'static str>,
) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response =
        (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response();
    if let Some(disposition) = disposition {
        response.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            header::HeaderValue::from_static(disposition),
        );
    }
    response
}

fn plain_text(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
        message,
    )
        .into_response()
}
