use axum::Router;
use cni_webhook::config::{Config, TlsConfig};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        tls_config: TlsConfig {
            cert_file: PathBuf::from("tls.crt"),
            key_file: PathBuf::from("tls.key"),
        },
        request_timeout: Duration::from_secs(15),
        cni_type_label: "hackaton-cni".to_owned(),
        cni_version_label: "hackaton-cni-version".to_owned(),
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) fn app(config: Config) -> Router {
    cni_webhook::router(&config)
}
