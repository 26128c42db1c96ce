//! Explicit deployment configuration.
//!
//! Networks are selected by name. A network is described by the networks
//! file (TOML, one table per network), by the built-in defaults, and finally
//! by command line overrides, in increasing order of precedence.

use {
    crate::{arguments::Arguments, error::Error},
    anyhow::Context,
    serde::Deserialize,
    std::{
        collections::HashMap,
        path::{Path, PathBuf},
        time::Duration,
    },
    url::Url,
};

const DEFAULT_CURRENCY_SYMBOL: &str = "ETH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub url: Url,
    /// Chain id the node has to report. Unchecked when `None`.
    pub chain_id: Option<u64>,
    pub currency_symbol: String,
}

/// Where the deployer's signing key comes from. Keys are kept as given and
/// only validated when the signer is built.
#[derive(Clone, PartialEq, Eq)]
pub enum SignerSource {
    PrivateKey(String),
    Mnemonic { phrase: String, index: u32 },
}

impl std::fmt::Debug for SignerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(SECRET)"),
            Self::Mnemonic { index, .. } => f
                .debug_struct("Mnemonic")
                .field("phrase", &"SECRET")
                .field("index", index)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Resolve the artifact by contract name inside a Hardhat artifacts
    /// directory.
    Named {
        artifacts_dir: PathBuf,
        contract_name: String,
    },
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub signer: Option<SignerSource>,
    pub artifact: ArtifactSource,
    pub required_confirmations: u64,
    pub confirmation_timeout: Option<Duration>,
}

impl Config {
    /// Builds the configuration from the command line, reading the networks
    /// file if it exists.
    pub async fn load(args: &Arguments) -> Result<Self, Error> {
        let networks = match tokio::fs::try_exists(&args.networks_file).await {
            Ok(true) => Some(NetworksFile::load(&args.networks_file).await?),
            Ok(false) => {
                tracing::debug!(path = ?args.networks_file, "no networks file");
                None
            }
            Err(err) => {
                return Err(anyhow::Error::from(err)
                    .context(format!("cannot access {}", args.networks_file.display()))
                    .into());
            }
        };
        Self::resolve(args, networks.as_ref())
    }

    fn resolve(args: &Arguments, networks: Option<&NetworksFile>) -> Result<Self, Error> {
        let entry = networks.and_then(|file| file.0.get(&args.network));
        let builtin = builtin_network(&args.network);

        let url = args
            .node_url
            .clone()
            .or_else(|| entry.map(|entry| entry.url.clone()))
            .or_else(|| builtin.as_ref().map(|network| network.url.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown network `{}`: add it to {} or pass --node-url",
                    args.network,
                    args.networks_file.display()
                )
            })?;
        let chain_id = args
            .chain_id
            .or_else(|| entry.and_then(|entry| entry.chain_id))
            .or_else(|| builtin.as_ref().and_then(|network| network.chain_id));
        let currency_symbol = args
            .currency_symbol
            .clone()
            .or_else(|| entry.and_then(|entry| entry.currency_symbol.clone()))
            .or_else(|| {
                builtin
                    .as_ref()
                    .map(|network| network.currency_symbol.clone())
            })
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        let signer = match (&args.private_key, &args.mnemonic) {
            (Some(key), _) => Some(SignerSource::PrivateKey(key.clone())),
            (None, Some(phrase)) => Some(SignerSource::Mnemonic {
                phrase: phrase.clone(),
                index: args.mnemonic_index,
            }),
            (None, None) => entry.and_then(NetworkEntry::signer),
        };

        let artifact = match &args.artifact {
            Some(path) => ArtifactSource::File(path.clone()),
            None => ArtifactSource::Named {
                artifacts_dir: args.artifacts_dir.clone(),
                contract_name: args.contract_name.clone(),
            },
        };

        Ok(Self {
            network: Network {
                name: args.network.clone(),
                url,
                chain_id,
                currency_symbol,
            },
            signer,
            artifact,
            required_confirmations: args.required_confirmations.max(1),
            confirmation_timeout: args.confirmation_timeout,
        })
    }
}

/// Networks known without any configuration file.
fn builtin_network(name: &str) -> Option<Network> {
    let (url, chain_id, currency_symbol) = match name {
        "coreTestnet2" => ("https://rpc.test2.btcs.network", 1114, "CORE"),
        "coreMainnet" => ("https://rpc.coredao.org", 1116, "CORE"),
        "localhost" => ("http://127.0.0.1:8545", 31337, "ETH"),
        _ => return None,
    };
    Some(Network {
        name: name.to_string(),
        url: url.parse().ok()?,
        chain_id: Some(chain_id),
        currency_symbol: currency_symbol.to_string(),
    })
}

/// Contents of the networks file, keyed by network name.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct NetworksFile(HashMap<String, NetworkEntry>);

impl NetworksFile {
    async fn load(path: &Path) -> anyhow::Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("I/O error while reading {}", path.display()))?;
        // Not including the parser's message, it could echo a private key.
        toml::de::from_str(&data).map_err(|err| {
            anyhow::anyhow!(
                "TOML error while reading {}{}",
                path.display(),
                location(&data, &err)
            )
        })
    }
}

fn location(data: &str, err: &toml::de::Error) -> String {
    err.span()
        .map(|span| {
            let line = data[..span.start].matches('\n').count() + 1;
            format!(" at line {line}")
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct NetworkEntry {
    url: Url,
    chain_id: Option<u64>,
    private_key: Option<String>,
    mnemonic: Option<String>,
    #[serde(default)]
    mnemonic_index: u32,
    currency_symbol: Option<String>,
}

impl NetworkEntry {
    fn signer(&self) -> Option<SignerSource> {
        match (&self.private_key, &self.mnemonic) {
            (Some(key), _) => Some(SignerSource::PrivateKey(key.clone())),
            (None, Some(phrase)) => Some(SignerSource::Mnemonic {
                phrase: phrase.clone(),
                index: self.mnemonic_index,
            }),
            (None, None) => None,
        }
    }
}
