//! The deployer's view of the blockchain.
//!
//! The trait keeps the workflow independent from the node so it can be
//! exercised against mocks.

use {
    crate::error::Error,
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256, Bytes, U256},
        providers::{DynProvider, PendingTransactionBuilder, Provider},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    std::time::Duration,
    url::Url,
};

/// The confirmed outcome of a contract-creation transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub transaction_hash: B256,
    pub contract_address: Address,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Address of the account signing the deployment.
    fn signer_address(&self) -> Address;

    /// Native token balance of `address` in wei.
    async fn balance(&self, address: Address) -> Result<U256, Error>;

    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, Error>;

    /// Broadcasts a contract-creation transaction carrying `code` and returns
    /// its hash without waiting for it to be mined.
    async fn submit_deployment(&self, code: Bytes) -> Result<B256, Error>;

    /// Waits until the deployment transaction is buried under
    /// `confirmations` blocks. Waits forever when `timeout` is `None`.
    async fn await_deployment(
        &self,
        tx: B256,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> Result<DeploymentReceipt, Error>;
}

/// [`Chain`] backed by a JSON-RPC node.
pub struct RpcChain {
    provider: DynProvider,
    signer: Address,
}

impl RpcChain {
    pub fn new(url: &Url, signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self::with_provider(crate::rpc::provider(url, signer), address)
    }

    /// Uses an already configured provider. Its wallet has to hold a key for
    /// `signer`.
    pub fn with_provider(provider: DynProvider, signer: Address) -> Self {
        Self { provider, signer }
    }
}

#[async_trait::async_trait]
impl Chain for RpcChain {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn balance(&self, address: Address) -> Result<U256, Error> {
        self.provider
            .get_balance(address)
            .await
            .map_err(Error::from_read)
    }

    async fn chain_id(&self) -> Result<u64, Error> {
        self.provider.get_chain_id().await.map_err(Error::from_read)
    }

    async fn submit_deployment(&self, code: Bytes) -> Result<B256, Error> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_deploy_code(code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(Error::from_submission)?;
        Ok(*pending.tx_hash())
    }

    async fn await_deployment(
        &self,
        tx: B256,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> Result<DeploymentReceipt, Error> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx)
            .with_required_confirmations(confirmations)
            .with_timeout(timeout)
            .get_receipt()
            .await
            .map_err(Error::from_confirmation)?;
        deployment_receipt(tx, &receipt)
    }
}

/// Checks that a mined transaction succeeded and created a contract.
fn deployment_receipt(
    tx: B256,
    receipt: &impl ReceiptResponse,
) -> Result<DeploymentReceipt, Error> {
    if !receipt.status() {
        return Err(Error::DeploymentRejected(format!(
            "deployment transaction {tx} reverted"
        )));
    }
    let contract_address = receipt.contract_address().ok_or_else(|| {
        Error::DeploymentRejected(format!("transaction {tx} did not create a contract"))
    })?;
    Ok(DeploymentReceipt {
        transaction_hash: receipt.transaction_hash(),
        contract_address,
        block_number: receipt.block_number(),
        gas_used: receipt.gas_used(),
    })
}
