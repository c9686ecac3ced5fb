use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::catalog::CatalogStore;
use crate::client::{LocalClient, NotesSource};
use crate::config::AllowedOrigins;
use crate::web;

/// API plus viewer pages over one store, as run by the `coursenotes` binary.
pub fn app(store: Arc<dyn CatalogStore>, origins: &AllowedOrigins) -> Router {
    let viewer_source: Arc<dyn NotesSource> = Arc::new(LocalClient::new(Arc::clone(&store)));
    api::router(AppState { store })
        .merge(web::router(viewer_source))
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
}

/// Viewer pages only, reading through `source`.
pub fn viewer_app(source: Arc<dyn NotesSource>) -> Router {
    web::router(source).layer(TraceLayer::new_for_http())
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring invalid CLIENT_ORIGIN entry");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}

pub async fn serve(app: Router, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = axum::Server::try_bind(&addr)?;
    tracing::info!(%addr, "listening");
    server
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
