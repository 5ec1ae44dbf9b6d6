mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod tracing;

use admission_mutator::{mutation::ClusterCniMutator, review::ReviewHandler};
use anyhow::Result;
use axum::{routing::post, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::{handlers::mutate_handler, state::ApiServerState};
use crate::config::{Config, MUTATE_PATH};

pub struct CniWebhook {
    router: Router,
    addr: SocketAddr,
    tls_config: RustlsConfig,
}

impl CniWebhook {
    /// Build the webhook. The TLS material is loaded here, once.
    pub async fn new_from_config(config: &Config) -> Result<Self> {
        let tls_config = certs::create_tls_config(&config.tls_config).await?;

        Ok(Self {
            router: router(config),
            addr: config.addr,
            tls_config,
        })
    }

    pub async fn run(self) -> Result<()> {
        self.serve(Handle::new()).await
    }

    /// Serve HTTPS requests until the server stops. The `handle` can be used
    /// to find out the listening address or to shut the server down.
    pub async fn serve(self, handle: Handle) -> Result<()> {
        ::tracing::info!(
            address = self.addr.to_string().as_str(),
            path = MUTATE_PATH,
            "started HTTPS server"
        );

        axum_server::bind_rustls(self.addr, self.tls_config)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        Ok(())
    }
}

/// The HTTP routes of the webhook, without the TLS layer.
pub fn router(config: &Config) -> Router {
    let mutator = ClusterCniMutator::new(
        config.cni_type_label.as_str(),
        config.cni_version_label.as_str(),
    );
    let state = Arc::new(ApiServerState {
        review_handler: ReviewHandler::new(mutator),
    });

    Router::new()
        .route(MUTATE_PATH, post(mutate_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
}
