#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfmon/etfmon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod routes;

use axum::Router;
use etfmon::EtfAnalyzer;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{ConfigError, ServerConfig, load_dotenv};
pub use handlers::{ApiError, ApiResult};

/// The etfmon HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    analyzer: EtfAnalyzer,
}

impl Server {
    /// Create a new server.
    pub const fn new(config: ServerConfig, analyzer: EtfAnalyzer) -> Self {
        Self { config, analyzer }
    }

    /// Build the router with CORS and request tracing.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.analyzer.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind the configured host and port.
    ///
    /// Host names are resolved; the first address that binds wins.
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!(
            "Bound {}:{} to {}",
            self.config.host,
            self.config.port,
            listener.local_addr()?
        );
        Ok(listener)
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        info!("Starting etfmon server on {}:{}", self.config.host, self.config.port);

        let listener = self.bind().await?;
        axum::serve(listener, self.router()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etfmon::{ConstituentValidator, PriceStore};
    use rstest::rstest;
    use std::sync::Arc;

    fn server(host: &str) -> Server {
        let config = ServerConfig {
            host: host.to_string(),
            port: 0,
            ..ServerConfig::default()
        };
        let analyzer = EtfAnalyzer::new(
            Arc::new(PriceStore::from_csv("data/prices.csv")),
            ConstituentValidator::default(),
        );
        Server::new(config, analyzer)
    }

    #[rstest]
    #[case("127.0.0.1")]
    #[case("localhost")]
    #[tokio::test]
    async fn test_bind_honours_host(#[case] host: &str) {
        let listener = server(host).bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(addr.ip().is_loopback());
        assert!(!addr.ip().is_unspecified());
    }

    #[tokio::test]
    async fn test_bind_rejects_malformed_host() {
        assert!(server("bad\0host").bind().await.is_err());
    }
}
