//! HTTP service exposing the price lookup.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::amazon::ProductFetcher;
use crate::commands::{PriceCommand, PriceResponse};

const DOCS_PATH: &str = "/docs";
const DOCS_PAGE: &str = include_str!("docs.html");

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("listen address may not be empty")]
    EmptyListenAddr,
    #[error("invalid listen address `{address}`: {source}")]
    InvalidListenAddr {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to determine local address: {source}")]
    LocalAddr {
        #[source]
        source: std::io::Error,
    },
    #[error("axum server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn ProductFetcher>,
    pub command: PriceCommand,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn ProductFetcher>, command: PriceCommand) -> Self {
        Self { fetcher, command }
    }
}

#[derive(Debug, Serialize, Copy, Clone, PartialEq, Eq)]
struct HealthzResponse {
    status: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(DOCS_PATH, get(docs))
        .route("/healthz", get(healthz))
        .route("/get_price/:asin", get(get_price))
        .with_state(state)
}

/// Serves the router until `shutdown` resolves.
pub async fn serve(
    listen_addr: &str,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let listen_addr = parse_listen_addr(listen_addr)?;
    let listener = bind_listener(listen_addr).await?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::LocalAddr { source })?;
    tracing::info!(%local_addr, "amz-price listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| ServerError::Serve { source })?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to capture Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to capture SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = sigterm => tracing::info!("received SIGTERM"),
    }
}

async fn index() -> Redirect {
    Redirect::temporary(DOCS_PATH)
}

async fn docs() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthzResponse { status: "ok" })
}

/// Looks up the current price of a product.
async fn get_price(
    State(state): State<AppState>,
    Path(asin): Path<String>,
) -> Json<PriceResponse> {
    Json(state.command.lookup(state.fetcher.as_ref(), &asin).await)
}

fn parse_listen_addr(addr: &str) -> Result<SocketAddr, ServerError> {
    let trimmed = addr.trim();
    if trimmed.is_empty() {
        return Err(ServerError::EmptyListenAddr);
    }

    trimmed
        .parse()
        .map_err(|source| ServerError::InvalidListenAddr {
            address: trimmed.to_string(),
            source,
        })
}

async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: addr.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listen_addr_accepts_ipv4_and_ipv6() {
        assert_eq!(
            parse_listen_addr(" 127.0.0.1:8000 ").unwrap(),
            "127.0.0.1:8000".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_listen_addr("[::1]:8080").is_ok());
    }

    #[test]
    fn parse_listen_addr_rejects_empty() {
        assert!(matches!(parse_listen_addr("  "), Err(ServerError::EmptyListenAddr)));
    }

    #[test]
    fn parse_listen_addr_rejects_garbage() {
        let err = parse_listen_addr("localhost").unwrap_err();
        assert!(matches!(err, ServerError::InvalidListenAddr { .. }));
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn docs_page_lists_endpoint() {
        assert!(DOCS_PAGE.contains("/get_price/"));
    }
}
