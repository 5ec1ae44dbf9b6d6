use std::{path::Path, sync::Arc};

use ::tracing::{info, warn};
use anyhow::{anyhow, Result};
use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;
use rustls_pki_types::{pem::SliceIter, CertificateDer, PrivateKeyDer};

use crate::config::TlsConfig;

/// Load the certificate and key once and build the TLS configuration of the
/// server. The material is never reloaded: rotating the certificate requires
/// a restart.
pub(crate) async fn create_tls_config(tls_config: &TlsConfig) -> Result<RustlsConfig> {
    let (cert, key) = load_server_cert_and_key(&tls_config.cert_file, &tls_config.key_file).await?;
    let server_config = build_tls_server_config(cert, key)?;

    info!(
        cert_file = %tls_config.cert_file.display(),
        "Loaded TLS certificate"
    );

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

// Build the TLS server, no client authentication is performed
fn build_tls_server_config(
    cert: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut server_config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(cert, key)?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(server_config)
}

// Load the server certificate chain and key
async fn load_server_cert_and_key(
    cert_file: &Path,
    key_file: &Path,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let cert_contents = tokio::fs::read(cert_file)
        .await
        .map_err(|e| anyhow!("Error opening certificate file {}: {e}", cert_file.display()))?;
    let key_contents = tokio::fs::read(key_file)
        .await
        .map_err(|e| anyhow!("Error opening key file {}: {e}", key_file.display()))?;

    let cert_iterator: SliceIter<CertificateDer> =
        rustls_pki_types::pem::SliceIter::new(&cert_contents[..]);

    let certs: Vec<CertificateDer<'static>> = cert_iterator
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse certificate: {e}");
            }
            it.ok()
        })
        .collect();

    if certs.is_empty() {
        return Err(anyhow!(
            "Expected at least one certificate in certificate file {}, found none",
            cert_file.display()
        ));
    }

    let key_iterator: SliceIter<PrivateKeyDer> =
        rustls_pki_types::pem::SliceIter::new(&key_contents[..]);
    let mut keys: Vec<PrivateKeyDer<'static>> = key_iterator
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse private key: {e}");
            }
            it.ok()
        })
        .collect();

    if keys.len() != 1 {
        return Err(anyhow!(
            "Expected exactly one key in key file {}, found {}",
            key_file.display(),
            keys.len()
        ));
    }

    Ok((certs, keys.remove(0)))
}
