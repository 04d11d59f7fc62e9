pub mod api;
pub mod tools;

use std::{env, net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use meili::{MeiliClient, MeiliConfig, SearchBackend};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const ENV_ADDR: &str = "TOOLBOX_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8089";

pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Connect to the Meilisearch index named by `MS_URL`, `MS_MASTER_KEY`
    /// and `MS_INDEX_NAME`.
    pub fn from_env() -> Self {
        let config = MeiliConfig::from_env();
        info!(url = %config.url, index = %config.index, "using meilisearch backend");
        Self::new(Arc::new(MeiliClient::new(config)))
    }
}

/// Base router (healthcheck). Tool and task routes live in [`api::router`].
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Full application: base routes merged with the toolbox API.
pub fn app(state: Arc<AppState>) -> Router {
    api::router(state.clone()).merge(router(state))
}

/// Starts the toolbox server on `TOOLBOX_ADDR` (default 127.0.0.1:8089).
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let state = Arc::new(AppState::from_env());
    if let Err(err) = state.backend.health().await {
        // Searches fail individually until the backend comes up.
        warn!(error = %err, "search backend not reachable at startup");
    }

    let addr: SocketAddr = env::var(ENV_ADDR)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    info!(%addr, ns = tools::NAMESPACE, "starting toolbox");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("toolbox stopped");
    Ok(())
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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
}

async fn healthz() -> &'static str {
    "ok"
}
