use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_analyzer::config::AppConfig;
use lead_analyzer::error::AppError;
use lead_analyzer::telemetry::{self, LogSink};
use std::sync::atomic::Ordering;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState::new(prometheus_handle, config.analytics.clone());
    let readiness_flag = app_state.readiness.clone();

    let app = lead_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        timeline_days = config.analytics.timeline_days,
        "lead analyzer ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
