use admission_mutator::mutation::{DEFAULT_CNI_TYPE_LABEL, DEFAULT_CNI_VERSION_LABEL};
use clap::builder::PossibleValue;
use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("CNI_WEBHOOK_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("CNI_WEBHOOK_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("CNI_WEBHOOK_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("9443")
            .env("CNI_WEBHOOK_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("/var/run/secrets/webhook/tls.crt")
            .env("CNI_WEBHOOK_CERT_FILE")
            .help("Path to an X.509 certificate file for HTTPS"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("/var/run/secrets/webhook/tls.key")
            .env("CNI_WEBHOOK_KEY_FILE")
            .help("Path to an X.509 private key file for HTTPS"),
        Arg::new("request-timeout")
            .long("request-timeout")
            .value_name("SECONDS")
            .default_value("15")
            .env("CNI_WEBHOOK_REQUEST_TIMEOUT")
            .help("Abort requests that take longer than the given time"),
        Arg::new("cni-type-label")
            .long("cni-type-label")
            .value_name("LABEL")
            .default_value(DEFAULT_CNI_TYPE_LABEL)
            .env("CNI_WEBHOOK_CNI_TYPE_LABEL")
            .help("Cluster label holding the CNI plugin type"),
        Arg::new("cni-version-label")
            .long("cni-version-label")
            .value_name("LABEL")
            .default_value(DEFAULT_CNI_VERSION_LABEL)
            .env("CNI_WEBHOOK_CNI_VERSION_LABEL")
            .help("Cluster label holding the CNI plugin version"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
