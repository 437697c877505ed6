use axum::Router;
use axum::extract::State;
use axum::routing::get;
use log::{debug, info};

use crate::error::AppError;

#[derive(Clone, Copy)]
struct ServiceState {
    version: &'static str,
}

pub fn router(version: &'static str) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/version", get(version_handler))
        .with_state(ServiceState { version })
}

async fn hello() -> &'static str {
    "Hello, World!\n"
}

async fn version_handler(State(state): State<ServiceState>) -> String {
    format!("{}\n", state.version)
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
///
/// # Errors
/// Returns an error when the address cannot be bound or the server fails.
pub async fn serve(addr: &str, version: &'static str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    if let Ok(local) = listener.local_addr() {
        info!("Starting server at {local}");
    }

    axum::serve(listener, router(version))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)
}

/// Resolve once `listener` reports its signal. A listener that failed to
/// install never resolves, leaving shutdown to the remaining one.
async fn signal_or_park(listener: impl Future<Output = std::io::Result<()>>, name: &str) {
    if let Err(error) = listener.await {
        debug!("{name} handler unavailable: {error}");
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal_or_park(tokio::signal::ctrl_c(), "Ctrl-C");

    #[cfg(unix)]
    let terminate = signal_or_park(
        async {
            let mut signal =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
            signal.recv().await;
            Ok::<(), std::io::Error>(())
        },
        "SIGTERM",
    );

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
