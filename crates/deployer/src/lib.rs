pub mod arguments;
pub mod artifact;
pub mod chain;
pub mod config;
pub mod error;
pub mod report;
pub mod rpc;
pub mod signer;

pub use error::Error;
use {
    crate::{
        arguments::Arguments,
        artifact::Artifact,
        chain::{Chain, DeploymentReceipt, RpcChain},
        config::Config,
    },
    alloy::primitives::Address,
    clap::Parser,
    std::{io::Write, process::ExitCode},
};

/// A contract that was deployed and confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract_name: String,
    pub address: Address,
    pub network: String,
    pub chain_id: u64,
    pub deployer: Address,
    pub receipt: DeploymentReceipt,
}

/// Entry point of the `deploy` binary.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running deployer with validated arguments:\n{}", args);

    match run(&args, &mut std::io::stdout()).await {
        Ok(deployment) => {
            tracing::info!(address = %deployment.address, "deployment finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(?err, "deployment failed");
            // Nothing sensible left to do if stderr is gone.
            let _ = report::failure(&mut std::io::stderr(), &err);
            ExitCode::FAILURE
        }
    }
}

/// Resolves the configuration, connects to the selected network and deploys
/// the configured contract.
pub async fn run(args: &Arguments, out: &mut dyn Write) -> Result<Deployment, Error> {
    let config = Config::load(args).await?;
    tracing::debug!(?config, "resolved configuration");
    let artifact = Artifact::load(&config.artifact).await?;
    let signer = signer::load(config.signer.as_ref(), &config.network.name)?;
    let chain = RpcChain::new(&config.network.url, signer);
    deploy(&config, &artifact, &chain, out).await
}

/// Deploys `artifact` through `chain`, reporting progress to `out`.
///
/// Every step is awaited before the next one starts and the first failure
/// aborts the deployment. There is no balance check: a deployer without
/// funds still submits and lets the node reject the transaction.
pub async fn deploy(
    config: &Config,
    artifact: &Artifact,
    chain: &dyn Chain,
    out: &mut dyn Write,
) -> Result<Deployment, Error> {
    report::banner(out, &config.network.name)?;

    let deployer = chain.signer_address();
    report::account(out, deployer)?;

    let balance = chain.balance(deployer).await?;
    report::balance(out, balance, &config.network.currency_symbol)?;

    let chain_id = chain.chain_id().await?;
    if let Some(expected) = config.network.chain_id
        && expected != chain_id
    {
        return Err(Error::WrongChain {
            network: config.network.name.clone(),
            expected,
            actual: chain_id,
        });
    }

    report::deploying(out, &artifact.contract_name)?;
    let tx = chain.submit_deployment(artifact.bytecode.clone()).await?;
    tracing::info!(%tx, contract = %artifact.contract_name, "submitted deployment");

    let receipt = chain
        .await_deployment(
            tx,
            config.required_confirmations,
            config.confirmation_timeout,
        )
        .await?;

    let deployment = Deployment {
        contract_name: artifact.contract_name.clone(),
        address: receipt.contract_address,
        network: config.network.name.clone(),
        chain_id,
        deployer,
        receipt,
    };
    report::deployed(out, &deployment)?;
    report::summary(out, &deployment)?;
    Ok(deployment)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            chain::MockChain,
            config::{ArtifactSource, Network},
        },
        alloy::primitives::{B256, Bytes, U256, address},
        mockall::{Sequence, predicate::eq},
        std::sync::atomic::{AtomicU64, Ordering},
    };

    const DEPLOYER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const PROJECT: Address = address!("0xabcd000000000000000000000000000000001234");

    fn config() -> Config {
        Config {
            network: Network {
                name: "coreTestnet2".into(),
                url: "http://localhost:8545".parse().unwrap(),
                chain_id: Some(1114),
                currency_symbol: "CORE".into(),
            },
            signer: None,
            artifact: ArtifactSource::Named {
                artifacts_dir: "artifacts".into(),
                contract_name: "Project".into(),
            },
            required_confirmations: 1,
            confirmation_timeout: None,
        }
    }

    fn artifact() -> Artifact {
        Artifact {
            contract_name: "Project".into(),
            abi: Default::default(),
            bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]),
        }
    }

    fn receipt(address: Address) -> DeploymentReceipt {
        DeploymentReceipt {
            transaction_hash: B256::repeat_byte(0x11),
            contract_address: address,
            block_number: Some(1),
            gas_used: 100_000,
        }
    }

    /// A chain on which every step succeeds, deploying to `PROJECT`.
    fn healthy_chain(balance: U256) -> MockChain {
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain
            .expect_balance()
            .with(eq(DEPLOYER))
            .returning(move |_| Ok(balance));
        chain.expect_chain_id().returning(|| Ok(1114));
        chain
            .expect_submit_deployment()
            .times(1)
            .returning(|_| Ok(B256::repeat_byte(0x11)));
        chain
            .expect_await_deployment()
            .times(1)
            .returning(|_, _, _| Ok(receipt(PROJECT)));
        chain
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn happy_path_prints_summary() {
        let chain = healthy_chain(U256::from(2_000_000_000_000_000_000u64));
        let mut out = Vec::new();

        let deployment = deploy(&config(), &artifact(), &chain, &mut out)
            .await
            .unwrap();

        assert_eq!(deployment.address, PROJECT);
        assert_eq!(deployment.deployer, DEPLOYER);
        assert_eq!(deployment.chain_id, 1114);
        let out = output(out);
        assert!(out.contains("💰 Account balance: 2.0 CORE"));
        assert!(out.contains(&format!("✅ Project contract deployed to: {PROJECT}")));
        assert!(out.contains(&format!("Contract Address:  {PROJECT}")));
    }

    #[tokio::test]
    async fn steps_run_in_order() {
        let mut seq = Sequence::new();
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain
            .expect_balance()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(U256::from(1)));
        chain
            .expect_chain_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(1114));
        chain
            .expect_submit_deployment()
            .with(eq(artifact().bytecode))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(B256::repeat_byte(0x22)));
        chain
            .expect_await_deployment()
            .with(eq(B256::repeat_byte(0x22)), eq(1), eq(None))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(receipt(PROJECT)));

        deploy(&config(), &artifact(), &chain, &mut Vec::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn zero_balance_still_deploys() {
        let chain = healthy_chain(U256::ZERO);
        let mut out = Vec::new();

        let deployment = deploy(&config(), &artifact(), &chain, &mut out)
            .await
            .unwrap();

        assert_eq!(deployment.address, PROJECT);
        assert!(output(out).contains("💰 Account balance: 0.0 CORE"));
    }

    #[tokio::test]
    async fn balance_failure_aborts_before_submission() {
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain
            .expect_balance()
            .returning(|_| Err(Error::NetworkUnreachable("connection refused".into())));
        chain.expect_submit_deployment().never();
        chain.expect_await_deployment().never();
        let mut out = Vec::new();

        let err = deploy(&config(), &artifact(), &chain, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NetworkUnreachable(_)));
        assert_eq!(err.to_string(), "connection refused");
        let out = output(out);
        assert!(!out.contains("Deployment Summary"));
        assert!(!out.contains("Deploying Project contract"));
    }

    #[tokio::test]
    async fn rejection_message_is_propagated_unaltered() {
        let message = "execution reverted: Project: already initialized";
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain.expect_balance().returning(|_| Ok(U256::from(1)));
        chain.expect_chain_id().returning(|| Ok(1114));
        chain
            .expect_submit_deployment()
            .returning(|_| Ok(B256::repeat_byte(0x11)));
        chain
            .expect_await_deployment()
            .returning(move |_, _, _| Err(Error::DeploymentRejected(message.into())));
        let mut out = Vec::new();

        let err = deploy(&config(), &artifact(), &chain, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), message);
        assert!(!output(out).contains("Deployment Summary"));
    }

    #[tokio::test]
    async fn wrong_chain_aborts_before_submission() {
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain.expect_balance().returning(|_| Ok(U256::from(1)));
        chain.expect_chain_id().returning(|| Ok(1));
        chain.expect_submit_deployment().never();

        let err = deploy(&config(), &artifact(), &chain, &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::WrongChain {
                expected: 1114,
                actual: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unchecked_chain_id_is_reported_from_node() {
        let mut config = config();
        config.network.chain_id = None;
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain.expect_balance().returning(|_| Ok(U256::from(1)));
        chain.expect_chain_id().returning(|| Ok(31337));
        chain
            .expect_submit_deployment()
            .returning(|_| Ok(B256::repeat_byte(0x11)));
        chain
            .expect_await_deployment()
            .returning(|_, _, _| Ok(receipt(PROJECT)));

        let deployment = deploy(&config, &artifact(), &chain, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(deployment.chain_id, 31337);
    }

    #[tokio::test]
    async fn repeated_runs_deploy_new_contracts() {
        let counter = AtomicU64::new(1);
        let mut chain = MockChain::new();
        chain.expect_signer_address().return_const(DEPLOYER);
        chain.expect_balance().returning(|_| Ok(U256::from(1)));
        chain.expect_chain_id().returning(|| Ok(1114));
        chain
            .expect_submit_deployment()
            .times(2)
            .returning(|_| Ok(B256::repeat_byte(0x11)));
        chain
            .expect_await_deployment()
            .times(2)
            .returning(move |_, _, _| {
                let nonce = counter.fetch_add(1, Ordering::SeqCst);
                Ok(receipt(Address::with_last_byte(nonce as u8)))
            });

        let first = deploy(&config(), &artifact(), &chain, &mut Vec::new())
            .await
            .unwrap();
        let second = deploy(&config(), &artifact(), &chain, &mut Vec::new())
            .await
            .unwrap();

        // Deploying is not idempotent: every run creates a fresh contract.
        assert_ne!(first.address, second.address);
    }
}
