use metrics_exporter_prometheus::PrometheusHandle;
use offer_planner::planning::ResponseShape;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) delegated: bool,
}

pub(crate) fn parse_shape(raw: &str) -> Result<ResponseShape, String> {
    ResponseShape::parse(raw)
        .ok_or_else(|| format!("unknown response format '{raw}' (expected verbose or compact)"))
}
