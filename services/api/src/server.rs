use crate::cli::ServeArgs;
use crate::infra::{apply_seed, read_seed, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use skill_swap::config::AppConfig;
use skill_swap::error::AppError;
use skill_swap::marketplace::{
    InMemorySwapRepository, InMemoryUserRepository, SkillSwapService, SwapRequestGuard,
};
use skill_swap::telemetry;
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
    };

    let guard = SwapRequestGuard::new(config.marketplace.min_message_chars);
    let service = Arc::new(SkillSwapService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemorySwapRepository::default()),
        guard,
    ));

    if let Some(path) = args.seed.take() {
        let members = read_seed(&path)?;
        apply_seed(&*service, members)?;
    }

    let app = with_marketplace_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        min_message_chars = config.marketplace.min_message_chars,
        "skill swap marketplace ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
