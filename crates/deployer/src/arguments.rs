use {
    clap::Parser,
    std::{path::PathBuf, time::Duration},
    tracing::Level,
    url::Url,
};

#[derive(Debug, Parser)]
#[clap(
    name = "deploy",
    about = "Deploys a compiled contract and prints its address"
)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Name of the network to deploy to. Looked up in the networks file and
    /// among the built-in networks.
    #[clap(long, env, default_value = "coreTestnet2")]
    pub network: String,

    /// TOML file describing the available networks.
    #[clap(long, env, default_value = "networks.toml")]
    pub networks_file: PathBuf,

    /// The node URL to connect to. Overrides the selected network's URL.
    #[clap(long, env)]
    pub node_url: Option<Url>,

    /// Chain id the node is expected to report. Overrides the selected
    /// network's chain id.
    #[clap(long, env)]
    pub chain_id: Option<u64>,

    /// 32-byte hex encoded private key of the deployer account. Validated
    /// when the signer is loaded so a malformed key is never echoed back.
    #[clap(long, env, conflicts_with = "mnemonic")]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic the deployer account is derived from.
    #[clap(long, env)]
    pub mnemonic: Option<String>,

    /// Derivation index used together with `--mnemonic`.
    #[clap(long, env, default_value = "0")]
    pub mnemonic_index: u32,

    /// Directory holding the compiled artifacts, laid out as
    /// `contracts/<Name>.sol/<Name>.json`.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Explicit artifact file. Takes precedence over `--artifacts-dir`.
    #[clap(long, env)]
    pub artifact: Option<PathBuf>,

    /// Name of the contract to deploy.
    #[clap(long, env, default_value = "Project")]
    pub contract_name: String,

    /// Symbol printed next to the deployer's balance. Overrides the selected
    /// network's symbol.
    #[clap(long, env)]
    pub currency_symbol: Option<String>,

    /// Number of blocks the deployment has to be buried under before it is
    /// considered confirmed.
    #[clap(long, env, default_value = "1")]
    pub required_confirmations: u64,

    /// Give up waiting for the deployment after this long. Waits forever
    /// when unset.
    #[clap(long, env, value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Option<Duration>,
}

#[derive(Debug, Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn")]
    pub log_filter: String,

    /// Log events at least this severe go to stderr, less severe ones to
    /// stdout. All logs go to stderr when unset.
    #[clap(long, env)]
    pub log_stderr_threshold: Option<Level>,

    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::config::Config {
        observe::config::Config::new(
            &self.log_filter,
            self.log_stderr_threshold,
            self.use_json_logs,
        )
    }
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            logging,
            network,
            networks_file,
            node_url,
            chain_id,
            private_key,
            mnemonic,
            mnemonic_index,
            artifacts_dir,
            artifact,
            contract_name,
            currency_symbol,
            required_confirmations,
            confirmation_timeout,
        } = self;

        writeln!(f, "log_filter: {}", logging.log_filter)?;
        writeln!(
            f,
            "log_stderr_threshold: {:?}",
            logging.log_stderr_threshold
        )?;
        writeln!(f, "use_json_logs: {}", logging.use_json_logs)?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "networks_file: {}", networks_file.display())?;
        writeln!(f, "node_url: {node_url:?}")?;
        writeln!(f, "chain_id: {chain_id:?}")?;
        display_secret_option(f, "private_key", private_key.as_ref())?;
        display_secret_option(f, "mnemonic", mnemonic.as_ref())?;
        writeln!(f, "mnemonic_index: {mnemonic_index}")?;
        writeln!(f, "artifacts_dir: {}", artifacts_dir.display())?;
        writeln!(f, "artifact: {artifact:?}")?;
        writeln!(f, "contract_name: {contract_name}")?;
        writeln!(f, "currency_symbol: {currency_symbol:?}")?;
        writeln!(f, "required_confirmations: {required_confirmations}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        Ok(())
    }
}

fn display_secret_option<T>(
    f: &mut std::fmt::Formatter,
    name: &str,
    option: Option<&T>,
) -> std::fmt::Result {
    writeln!(f, "{name}: {}", option.map(|_| "SECRET").unwrap_or("None"))
}
