use alloy::{
    providers::PendingTransactionError,
    transports::{RpcError, TransportError},
};

/// Everything that can abort a deployment. Variants carrying a message
/// display it verbatim so the reason reported by the node or the framework
/// reaches the user unaltered.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable signer is configured.
    #[error("{0}")]
    IdentityUnavailable(String),
    /// The RPC endpoint could not be reached or timed out.
    #[error("{0}")]
    NetworkUnreachable(String),
    /// The node is connected to a different chain than the selected network.
    #[error("network `{network}` expects chain id {expected} but the node reports {actual}")]
    WrongChain {
        network: String,
        expected: u64,
        actual: u64,
    },
    /// The contract artifact is missing, malformed or cannot be deployed
    /// without constructor arguments.
    #[error("{0}")]
    InvalidArtifact(String),
    /// The transaction reverted, was dropped or was rejected by the node.
    #[error("{0}")]
    DeploymentRejected(String),
    #[error("{0:#}")]
    UnknownFailure(#[from] anyhow::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::UnknownFailure(err.into())
    }
}

impl Error {
    /// Classifies an error returned by a read-only RPC call. Whatever went
    /// wrong, the node did not give us the data we need to continue.
    pub fn from_read(err: TransportError) -> Self {
        tracing::debug!(?err, "rpc read failed");
        Self::NetworkUnreachable(err.to_string())
    }

    /// Classifies an error returned while submitting a transaction. An error
    /// response means the node looked at the transaction and refused it, every
    /// other failure means we never got an answer.
    pub fn from_submission(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => {
                tracing::debug!(?payload, "node rejected transaction");
                Self::DeploymentRejected(payload.message.to_string())
            }
            err if is_connectivity_error(&err) => Self::NetworkUnreachable(err.to_string()),
            err => Self::UnknownFailure(err.into()),
        }
    }

    /// Classifies an error returned while waiting for a transaction receipt.
    pub fn from_confirmation(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => Self::from_submission(err),
            // Timeouts and dropped watchers leave the transaction's fate to
            // the network, from our point of view it never got confirmed.
            err => Self::DeploymentRejected(err.to_string()),
        }
    }
}

fn is_connectivity_error(err: &TransportError) -> bool {
    matches!(err, RpcError::Transport(_) | RpcError::NullResp)
}
