use anyhow::{anyhow, Result};
use tracing::{error, info};

use cni_webhook::{cli, config::Config, tracing::setup_tracing, CniWebhook};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;

    // Starting from rustls 0.22, each application must set its default crypto provider.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Cannot install the rustls crypto provider"))?;

    info!(
        cni_type_label = config.cni_type_label.as_str(),
        cni_version_label = config.cni_version_label.as_str(),
        "creating cluster CNI webhook"
    );

    let webhook = CniWebhook::new_from_config(&config).await.inspect_err(|e| {
        error!(error = %e, "cannot create the webhook server");
    })?;

    webhook.run().await
}
