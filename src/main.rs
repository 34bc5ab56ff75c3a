use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use backrooms_catalog::config::Config;
use backrooms_catalog::db::Database;
use backrooms_catalog::{AppState, app_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        static_dir = %cfg.static_dir.display(),
        protect_reads = cfg.protect_reads,
        protect_writes = cfg.protect_writes,
        loglevel = %cfg.loglevel
    );
    if cfg.uses_default_secret() {
        warn!("SESSION_SECRET not set; using the insecure development default");
    }
    if cfg.secure_cookie_with_dev_defaults() {
        warn!(
            "session cookie is marked Secure; browsers drop it over plain HTTP on \
             non-localhost hosts (set BACKROOMS_INSECURE_COOKIE=true for HTTP development)"
        );
    }

    let db = Database::connect(&cfg.database_url, cfg.query_timeout()).await?;
    let state = AppState::build(&cfg, db.clone()).await?;

    let sweeper = {
        let credentials = state.credentials.clone();
        let period = cfg.session_sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match credentials.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => info!(count = n, "purged expired sessions"),
                    Err(e) => warn!(error = %e, "failed to purge expired sessions"),
                }
            }
        })
    };

    let app = app_router(state);
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    db.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
