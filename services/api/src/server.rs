use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use terraviva::auth::session::SessionConfig;
use terraviva::config::AppConfig;
use terraviva::db::Database;
use terraviva::error::AppError;
use terraviva::telemetry;
use terraviva::uploads::UploadPolicy;
use tower_cookies::CookieManagerLayer;
use tracing::{error, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // Storage setup is fail-open: a broken database file is reported but the
    // process still comes up and surfaces 500s per request.
    let database = Database::new(&config.storage.database_path);
    if let Err(err) = database.init_schema() {
        error!(%err, "schema initialization failed");
    }
    match database.seed_default_user() {
        Ok(true) => info!("default CRM user seeded"),
        Ok(false) => {}
        Err(err) => error!(%err, "default CRM user seeding failed"),
    }

    let session_config = match config.session.secret.as_deref() {
        Some(secret) => SessionConfig::new(secret),
        None => {
            warn!("APP_SESSION_SECRET not set; sessions will not survive a restart");
            SessionConfig::generated()
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let state = AppState {
        db: database,
        uploads: UploadPolicy::new(&config.storage.upload_dir),
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = build_app(state, session_config).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "property catalog and CRM ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_app(state: AppState, session_config: SessionConfig) -> axum::Router {
    routes::router(state)
        .layer(CookieManagerLayer::new())
        .layer(Extension(session_config))
}
