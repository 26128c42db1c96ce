use {
    crate::{config::SignerSource, error::Error},
    alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
};

/// Builds the deployer's signing identity.
pub fn load(source: Option<&SignerSource>, network: &str) -> Result<PrivateKeySigner, Error> {
    let source = source.ok_or_else(|| {
        Error::IdentityUnavailable(format!(
            "no deployer account configured for network `{network}`: pass --private-key or \
             --mnemonic, or set one in the networks file"
        ))
    })?;
    let signer = match source {
        // The parser's message is dropped, it could quote parts of the key.
        SignerSource::PrivateKey(key) => key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|_| {
                Error::IdentityUnavailable(format!("invalid private key for network `{network}`"))
            })?,
        SignerSource::Mnemonic { phrase, index } => MnemonicBuilder::<English>::default()
            .phrase(phrase.as_str())
            .index(*index)
            .and_then(|builder| builder.build())
            .map_err(|err| Error::IdentityUnavailable(format!("invalid mnemonic: {err}")))?,
    };
    tracing::debug!(address = %signer.address(), "loaded deployer account");
    Ok(signer)
}
