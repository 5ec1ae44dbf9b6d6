use anyhow::{anyhow, Result};
use clap::ArgMatches;
use lazy_static::lazy_static;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The only path served by the webhook.
pub const MUTATE_PATH: &str = "/mutate-cluster-cni";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

/// Settings of the webhook, built once at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: TlsConfig,
    pub request_timeout: Duration,
    pub cni_type_label: String,
    pub cni_version_label: String,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;
        let tls_config = tls_files(matches)?;
        let request_timeout = request_timeout(matches)?;

        let cni_type_label = label_key(matches, "cni-type-label")?;
        let cni_version_label = label_key(matches, "cni-version-label")?;

        let log_level = matches
            .get_one::<String>("log-level")
            .expect("This should not happen, there's a default value for log-level")
            .to_owned();
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .expect("This should not happen, there's a default value for log-fmt")
            .to_owned();
        let log_no_color = matches
            .get_one::<bool>("log-no-color")
            .expect("clap should have assigned a default value")
            .to_owned();

        Ok(Self {
            addr,
            tls_config,
            request_timeout,
            cni_type_label,
            cni_version_label,
            log_level,
            log_fmt,
            log_no_color,
        })
    }
}

fn api_bind_address(matches: &ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        matches
            .get_one::<String>("address")
            .expect("clap should have set a default value"),
        matches
            .get_one::<String>("port")
            .expect("clap should have set a default value")
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_files(matches: &ArgMatches) -> Result<TlsConfig> {
    let cert_file = matches
        .get_one::<String>("cert-file")
        .expect("clap should have set a default value");
    let key_file = matches
        .get_one::<String>("key-file")
        .expect("clap should have set a default value");
    if cert_file.is_empty() || key_file.is_empty() {
        return Err(anyhow!(
            "error parsing arguments: both --cert-file and --key-file must be provided"
        ));
    }

    Ok(TlsConfig {
        cert_file: PathBuf::from(cert_file),
        key_file: PathBuf::from(key_file),
    })
}

fn request_timeout(matches: &ArgMatches) -> Result<Duration> {
    let seconds = matches
        .get_one::<String>("request-timeout")
        .expect("clap should have set a default value")
        .parse::<u64>()
        .map_err(|e| anyhow!("error parsing --request-timeout: {}", e))?;
    if seconds == 0 {
        return Err(anyhow!("--request-timeout must be greater than zero"));
    }

    Ok(Duration::from_secs(seconds))
}

fn label_key(matches: &ArgMatches, arg: &str) -> Result<String> {
    let key = matches
        .get_one::<String>(arg)
        .expect("clap should have set a default value")
        .trim()
        .to_owned();
    if key.is_empty() {
        return Err(anyhow!("--{arg} cannot be empty"));
    }

    Ok(key)
}
