use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_planning_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use offer_planner::config::AppConfig;
use offer_planner::error::AppError;
use offer_planner::planning::OptimizeService;
use offer_planner::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        delegated: config.optimizer.is_delegated(),
    };

    let service = Arc::new(OptimizeService::from_config(&config.optimizer));
    match service.upstream() {
        Some(upstream) => info!(backend = upstream.base_url(), "delegating to optimizer backend"),
        None => info!("no optimizer backend configured; using local allocation engine"),
    }

    let app = with_planning_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "offer planner ready");

    axum::serve(listener, app).await?;
    Ok(())
}
