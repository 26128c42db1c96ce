//! Compiled contract artifacts in the Hardhat JSON format.

use {
    crate::{config::ArtifactSource, error::Error},
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
};

/// A deployable contract: its interface and creation bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    abi: JsonAbi,
    /// Kept as a string so unlinked library placeholders produce a readable
    /// error instead of a hex decoding failure.
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, serde_json::Value>,
}

impl Artifact {
    /// Path of a contract's artifact inside a Hardhat artifacts directory.
    pub fn path(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
        artifacts_dir
            .join("contracts")
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json"))
    }

    pub async fn load(source: &ArtifactSource) -> Result<Self, Error> {
        let path = match source {
            ArtifactSource::Named {
                artifacts_dir,
                contract_name,
            } => Self::path(artifacts_dir, contract_name),
            ArtifactSource::File(path) => path.clone(),
        };
        let data = tokio::fs::read_to_string(&path).await.map_err(|err| {
            Error::InvalidArtifact(format!(
                "cannot read artifact {}: {err}; did you compile the contracts?",
                path.display()
            ))
        })?;
        let artifact = Self::parse(&data)
            .map_err(|err| Error::InvalidArtifact(format!("{}: {err}", path.display())))?;

        if let ArtifactSource::Named { contract_name, .. } = source
            && artifact.contract_name != *contract_name
        {
            return Err(Error::InvalidArtifact(format!(
                "{} contains contract `{}`, expected `{contract_name}`",
                path.display(),
                artifact.contract_name
            )));
        }
        tracing::debug!(
            path = %path.display(),
            size = artifact.bytecode.len(),
            functions = artifact.abi.functions().count(),
            "loaded artifact"
        );
        Ok(artifact)
    }

    /// Parses an artifact and checks that it can be deployed without
    /// constructor arguments.
    pub fn parse(data: &str) -> Result<Self, String> {
        let file: ArtifactFile = serde_json::from_str(data).map_err(|err| err.to_string())?;

        if !file.link_references.is_empty() {
            let libraries = file.link_references.keys().cloned().collect::<Vec<_>>();
            return Err(format!(
                "`{}` needs to be linked against {} first",
                file.contract_name,
                libraries.join(", ")
            ));
        }
        let bytecode = file
            .bytecode
            .parse::<Bytes>()
            .map_err(|err| format!("malformed bytecode: {err}"))?;
        if bytecode.is_empty() {
            return Err(format!(
                "`{}` has no bytecode, it is abstract or an interface",
                file.contract_name
            ));
        }
        if let Some(constructor) = file.abi.constructor()
            && !constructor.inputs.is_empty()
        {
            return Err(format!(
                "`{}` takes {} constructor argument(s), only argument-less constructors are \
                 supported",
                file.contract_name,
                constructor.inputs.len()
            ));
        }

        Ok(Self {
            contract_name: file.contract_name,
            abi: file.abi,
            bytecode,
        })
    }
}
