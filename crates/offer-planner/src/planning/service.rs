use std::time::Duration;

use axum::body::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::allocation::allocate;
use super::domain::{PlanOutcome, ResponseShape};
use super::metrics::{summarize, ComputationError};
use super::request::{normalize, NormalizedRequest};
use super::response::{format_plan, FormattedPlan};
use super::upstream::{UpstreamOptimizer, UpstreamReply, UpstreamUnavailable};
use super::validation::validate;
use crate::config::OptimizerConfig;

/// Upper bound for the caller-requested latency-testing delay.
pub const MAX_ARTIFICIAL_DELAY: Duration = Duration::from_millis(10_000);

/// Result of running the local pipeline on one request.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlan {
    pub request: NormalizedRequest,
    pub outcome: PlanOutcome,
    pub warnings: Vec<String>,
}

/// Per-request knobs supplied outside the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub shape: Option<ResponseShape>,
    pub delay: Option<Duration>,
}

impl OptimizeOptions {
    pub fn with_delay_ms(mut self, delay_ms: Option<u64>) -> Self {
        self.delay = delay_ms
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms).min(MAX_ARTIFICIAL_DELAY));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeReply {
    Local(FormattedPlan),
    Forwarded(UpstreamReply),
}

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Upstream(#[from] UpstreamUnavailable),
    #[error(transparent)]
    Computation(#[from] ComputationError),
    #[error("optimizer backend is not configured")]
    BackendNotConfigured,
}

/// Runs normalize, validate, allocate and summarize on a parsed body.
pub fn plan_locally(body: &Value) -> Result<LocalPlan, OptimizeError> {
    let request = normalize(body);
    let report = validate(&request);

    for warning in &report.warnings {
        warn!(%warning, "planning request accepted with warning");
    }
    if !report.is_valid() {
        debug!(errors = report.errors.len(), "planning request rejected");
        return Err(OptimizeError::Validation(report.errors));
    }

    let allocation = allocate(&request.config, &request.channels, &request.products);
    let outcome = summarize(request.config.budget, allocation, &request.products)?;

    info!(
        model = request.config.model.label(),
        channels = outcome.channels.len(),
        budget = outcome.summary.budget_available,
        spend = outcome.summary.actual_spend,
        reach = outcome.summary.reach_clients,
        "local allocation computed"
    );

    Ok(LocalPlan {
        request,
        outcome,
        warnings: report.warnings,
    })
}

/// Unparseable bytes degrade to `null`, which normalizes to an empty model.
pub fn parse_body(body: &[u8]) -> Value {
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "request body is not valid JSON");
            Value::Null
        }
    }
}

/// Entry point shared by the HTTP routes: delegates when a backend is
/// configured, otherwise answers with the local engine.
#[derive(Debug, Clone, Default)]
pub struct OptimizeService {
    upstream: Option<UpstreamOptimizer>,
}

impl OptimizeService {
    pub fn local() -> Self {
        Self { upstream: None }
    }

    pub fn delegating(upstream: UpstreamOptimizer) -> Self {
        Self {
            upstream: Some(upstream),
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        match config.base_url.as_deref() {
            Some(url) => Self::delegating(UpstreamOptimizer::new(url)),
            None => Self::local(),
        }
    }

    pub fn upstream(&self) -> Option<&UpstreamOptimizer> {
        self.upstream.as_ref()
    }

    pub async fn optimize(
        &self,
        body: Bytes,
        options: OptimizeOptions,
    ) -> Result<OptimizeReply, OptimizeError> {
        if let Some(upstream) = &self.upstream {
            if let Some(delay) = options.delay {
                tokio::time::sleep(delay).await;
            }
            let reply = upstream.optimize(body).await?;
            return Ok(OptimizeReply::Forwarded(reply));
        }

        let plan = plan_locally(&parse_body(&body))?;
        let shape = options
            .shape
            .unwrap_or_else(|| plan.request.preferred_shape());
        Ok(OptimizeReply::Local(format_plan(&plan.outcome, shape)))
    }

    /// CSV export exists only on the external optimizer.
    pub async fn optimize_csv(
        &self,
        body: Bytes,
        options: OptimizeOptions,
    ) -> Result<UpstreamReply, OptimizeError> {
        let upstream = self
            .upstream
            .as_ref()
            .ok_or(OptimizeError::BackendNotConfigured)?;
        if let Some(delay) = options.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(upstream.optimize_csv(body).await?)
    }
}
