//! Human readable progress and summary output.

use {
    crate::{Deployment, error::Error},
    alloy::primitives::{Address, U256, utils},
    std::{
        fmt::{self, Display, Formatter},
        io::{self, Write},
    },
};

const RULE_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 19;

pub fn banner(out: &mut dyn Write, network: &str) -> io::Result<()> {
    writeln!(out, "🚀 Starting ChainAxis deployment on {network}...")?;
    writeln!(out)
}

pub fn account(out: &mut dyn Write, deployer: Address) -> io::Result<()> {
    writeln!(out, "📝 Deploying contracts with account: {deployer}")
}

pub fn balance(out: &mut dyn Write, wei: U256, currency_symbol: &str) -> io::Result<()> {
    writeln!(out, "💰 Account balance: {} {currency_symbol}", format_ether(wei))?;
    writeln!(out)
}

pub fn deploying(out: &mut dyn Write, contract_name: &str) -> io::Result<()> {
    writeln!(out, "📦 Deploying {contract_name} contract...")
}

pub fn deployed(out: &mut dyn Write, deployment: &Deployment) -> io::Result<()> {
    writeln!(
        out,
        "✅ {} contract deployed to: {}",
        deployment.contract_name, deployment.address
    )?;
    tracing::debug!(
        tx = %deployment.receipt.transaction_hash,
        block = ?deployment.receipt.block_number,
        gas_used = deployment.receipt.gas_used,
        "deployment confirmed"
    );
    Ok(())
}

/// Summary block and follow-up guidance printed after a successful
/// deployment.
pub fn summary(out: &mut dyn Write, deployment: &Deployment) -> io::Result<()> {
    write!(out, "{}", Summary(deployment))?;
    writeln!(out)?;
    writeln!(out, "📋 Next Steps:")?;
    writeln!(out, "1. Save the contract address for frontend integration")?;
    writeln!(out, "2. Verify the contract on block explorer (if available)")?;
    writeln!(out, "3. Test contract functions using Hardhat console or scripts")?;
    writeln!(out)?;
    writeln!(out, "💡 To verify the contract, run:")?;
    writeln!(
        out,
        "{}",
        verify_command(&deployment.network, deployment.address)
    )
}

/// Message printed to the error stream when a deployment fails.
pub fn failure(out: &mut dyn Write, err: &Error) -> io::Result<()> {
    writeln!(out, "❌ Error during deployment: {err}")
}

pub fn verify_command(network: &str, address: Address) -> String {
    format!("npx hardhat verify --network {network} {address}")
}

/// Formats a wei amount in ether, dropping insignificant trailing zeros but
/// always keeping one decimal (`0.0`, `1.5`).
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{whole}.{fraction}")
        }
        None => formatted,
    }
}

struct Summary<'a>(&'a Deployment);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let deployment = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "🎉 Deployment Summary")?;
        writeln!(f, "{rule}")?;
        field(f, "Contract Name:", &deployment.contract_name)?;
        field(f, "Contract Address:", &deployment.address)?;
        field(f, "Network:", &deployment.network)?;
        field(f, "Chain ID:", &deployment.chain_id)?;
        field(f, "Deployer:", &deployment.deployer)?;
        writeln!(f, "{rule}")
    }
}

fn field(f: &mut Formatter<'_>, label: &str, value: &dyn Display) -> fmt::Result {
    writeln!(f, "{label:<LABEL_WIDTH$}{value}")
}
