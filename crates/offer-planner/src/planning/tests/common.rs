use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{json, Value};

use crate::planning::{optimize_router, OptimizeService, UpstreamOptimizer};

pub(super) fn local_router() -> axum::Router {
    optimize_router(Arc::new(OptimizeService::local()))
}

pub(super) fn delegating_router(base_url: &str) -> axum::Router {
    optimize_router(Arc::new(OptimizeService::delegating(
        UpstreamOptimizer::new(base_url),
    )))
}

pub(super) fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializes")))
        .expect("request builds")
}

pub(super) fn raw_post(uri: &str, body: &'static str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json body")
}

/// The storefront defaults: three channels, three products.
pub(super) fn verbose_request() -> Value {
    json!({
        "budget": 100000,
        "model": "model2",
        "channels": [
            { "type": "sms", "max": 5000, "cost": 0.7 },
            { "type": "email", "max": 750000, "cost": 0.004 },
            { "type": "calls", "max": 2000, "cost": 2.9 },
        ],
        "products": [
            { "product": "mortgage", "ltv": 30000 },
            { "product": "pension", "ltv": 24000 },
            { "product": "savings", "ltv": 3500 },
        ],
    })
}

pub(super) fn compact_request() -> Value {
    json!({
        "budget": "100000",
        "model": "lightgbm",
        "channels": {
            "sms": [5000, "0,7"],
            "email": [750000, 0.004],
            "calls": [2000, 2.9],
        },
        "products": { "mortgage": 30000, "pension": 24000, "savings": "3500" },
    })
}
