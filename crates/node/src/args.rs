use crate::EnclaveConfig;

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use enclave_primitives::{
    constants::{
        DEFAULT_BASE_FEE, DEFAULT_BATCH_GAS_LIMIT, DEFAULT_L2_CHAIN_ID, DEFAULT_MAX_BATCH_SIZE,
        DEFAULT_MAX_ROLLUP_SIZE,
    },
    ChainConfig,
};
use std::{fs, path::PathBuf};

/// The role of the enclave in the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NodeType {
    /// Orders transactions into batches and batches into rollups.
    Sequencer,
    /// Replays the batches published by the sequencer.
    #[default]
    Validator,
}

/// The arguments of an enclave node.
#[derive(Debug, Clone, clap::Args)]
pub struct EnclaveArgs {
    /// The role of the enclave.
    #[arg(long = "node.type", value_enum, env = "ENCLAVE_NODE_TYPE", default_value_t = NodeType::Validator)]
    pub node_type: NodeType,
    /// The id of this enclave.
    #[arg(long = "node.enclave-id", id = "node_enclave_id", value_name = "ENCLAVE_ID", env = "ENCLAVE_ID", default_value_t = Address::ZERO)]
    pub enclave_id: Address,
    /// The chain arguments.
    #[command(flatten)]
    pub chain_args: ChainArgs,
    /// The sequencer arguments.
    #[command(flatten)]
    pub sequencer_args: SequencerArgs,
    /// The signer arguments.
    #[command(flatten)]
    pub signer_args: SignerArgs,
}

impl EnclaveArgs {
    /// Validate that a single signer key source is provided when the node is a sequencer.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_type == NodeType::Sequencer {
            match (&self.signer_args.key_file, &self.signer_args.private_key) {
                (None, None) => {
                    return Err(
                        "Either signer key file or private key is required for a sequencer"
                            .to_string(),
                    )
                }
                (Some(_), Some(_)) => {
                    return Err("Cannot specify more than one signer key source".to_string())
                }
                _ => {}
            }
        }
        if self.sequencer_args.max_batch_size == 0 || self.sequencer_args.max_rollup_size == 0 {
            return Err("Batch and rollup size limits must be positive".to_string());
        }
        Ok(())
    }

    /// Returns the parameters of the L2 chain.
    pub const fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            chain_id: self.chain_args.chain_id,
            gas_limit: self.chain_args.gas_limit,
            base_fee: self.chain_args.base_fee,
            l2_message_bus: self.chain_args.l2_message_bus,
            l1_message_bus: self.chain_args.l1_message_bus,
            management_contract: self.chain_args.management_contract,
        }
    }

    /// Returns the node configuration.
    pub const fn config(&self) -> EnclaveConfig {
        EnclaveConfig {
            chain: self.chain_config(),
            enclave_id: self.enclave_id,
            sequencer_id: self.sequencer_args.sequencer_id,
            max_batch_size: self.sequencer_args.max_batch_size,
            max_rollup_size: self.sequencer_args.max_rollup_size,
        }
    }
}

/// The parameters of the L2 chain.
#[derive(Debug, Clone, clap::Args)]
pub struct ChainArgs {
    /// The L2 chain id.
    #[arg(long = "chain.id", id = "chain_id", value_name = "CHAIN_ID", env = "ENCLAVE_CHAIN_ID", default_value_t = DEFAULT_L2_CHAIN_ID)]
    pub chain_id: u64,
    /// The gas limit of every batch.
    #[arg(long = "chain.gas-limit", id = "chain_gas_limit", value_name = "GAS_LIMIT", default_value_t = DEFAULT_BATCH_GAS_LIMIT)]
    pub gas_limit: u64,
    /// The base fee of every batch.
    #[arg(long = "chain.base-fee", id = "chain_base_fee", value_name = "BASE_FEE", default_value_t = DEFAULT_BASE_FEE)]
    pub base_fee: u64,
    /// The address of the L2 message bus.
    #[arg(long = "chain.l2-message-bus", id = "chain_l2_message_bus", value_name = "ADDRESS", default_value_t = ChainConfig::default().l2_message_bus)]
    pub l2_message_bus: Address,
    /// The address of the L1 message bus.
    #[arg(long = "chain.l1-message-bus", id = "chain_l1_message_bus", value_name = "ADDRESS", default_value_t = ChainConfig::default().l1_message_bus)]
    pub l1_message_bus: Address,
    /// The address of the L1 management contract.
    #[arg(long = "chain.management-contract", id = "chain_management_contract", value_name = "ADDRESS", default_value_t = ChainConfig::default().management_contract)]
    pub management_contract: Address,
}

impl Default for ChainArgs {
    fn default() -> Self {
        let config = ChainConfig::default();
        Self {
            chain_id: config.chain_id,
            gas_limit: config.gas_limit,
            base_fee: config.base_fee,
            l2_message_bus: config.l2_message_bus,
            l1_message_bus: config.l1_message_bus,
            management_contract: config.management_contract,
        }
    }
}

/// The arguments for the sequencer.
#[derive(Debug, Clone, clap::Args)]
pub struct SequencerArgs {
    /// The enclave id of the sequencer.
    #[arg(long = "sequencer.id", id = "sequencer_id", value_name = "ENCLAVE_ID", env = "ENCLAVE_SEQUENCER_ID", default_value_t = Address::ZERO)]
    pub sequencer_id: Address,
    /// The maximum encoded size of the transactions of a batch, in bytes.
    #[arg(long = "sequencer.max-batch-size", id = "sequencer_max_batch_size", value_name = "BYTES", default_value_t = DEFAULT_MAX_BATCH_SIZE)]
    pub max_batch_size: usize,
    /// The maximum encoded size of a rollup, in bytes.
    #[arg(long = "sequencer.max-rollup-size", id = "sequencer_max_rollup_size", value_name = "BYTES", default_value_t = DEFAULT_MAX_ROLLUP_SIZE)]
    pub max_rollup_size: usize,
}

impl Default for SequencerArgs {
    fn default() -> Self {
        Self {
            sequencer_id: Address::ZERO,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_rollup_size: DEFAULT_MAX_ROLLUP_SIZE,
        }
    }
}

/// The arguments for the signer of the sequencer.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct SignerArgs {
    /// Path to the file containing the signer's private key
    #[arg(
        long = "signer.key-file",
        value_name = "FILE_PATH",
        help = "Path to the hex-encoded private key file for the signer (optional 0x prefix). Mutually exclusive with --signer.private-key"
    )]
    pub key_file: Option<PathBuf>,

    /// The hex-encoded private key of the signer.
    #[arg(long = "signer.private-key", value_name = "KEY", env = "ENCLAVE_SIGNER_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl SignerArgs {
    /// Returns the configured signer, if any.
    pub fn signer(&self) -> eyre::Result<Option<PrivateKeySigner>> {
        let key = if let Some(key_file_path) = &self.key_file {
            fs::read_to_string(key_file_path)
                .map_err(|e| {
                    eyre::eyre!("Failed to read signer key file {}: {}", key_file_path.display(), e)
                })?
                .trim()
                .to_string()
        } else if let Some(key) = &self.private_key {
            key.trim().to_string()
        } else {
            return Ok(None);
        };

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| eyre::eyre!("Failed to create signer from private key: {}", e))?;
        tracing::info!(target: "enclave::node::args", address = ?signer.address(), "Created private key signer");
        Ok(Some(signer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        args: EnclaveArgs,
    }

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["enclave"]);
        assert_eq!(cli.args.node_type, NodeType::Validator);
        assert_eq!(cli.args.chain_config(), ChainConfig::default());

        let config = cli.args.config();
        assert_eq!(config.max_batch_size, 36 * 1024);
        assert_eq!(config.max_rollup_size, 128 * 1024);
        assert!(cli.args.validate().is_ok());
    }

    #[test]
    fn test_parse_sequencer_args() {
        let cli = Cli::parse_from([
            "enclave",
            "--node.type",
            "sequencer",
            "--chain.id",
            "777",
            "--sequencer.max-batch-size",
            "1024",
            "--sequencer.id",
            "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e",
            "--signer.private-key",
            KEY,
        ]);
        let config = cli.args.config();
        assert_eq!(cli.args.node_type, NodeType::Sequencer);
        assert_eq!(config.chain.chain_id, 777);
        assert_eq!(config.max_batch_size, 1024);
        assert_eq!(config.sequencer_id, Address::repeat_byte(0x5e));
        assert!(cli.args.validate().is_ok());
        assert!(cli.args.signer_args.signer().unwrap().is_some());
    }

    #[test]
    fn test_validate_sequencer_without_signer_fails() {
        let cli = Cli::parse_from(["enclave", "--node.type", "sequencer"]);
        assert!(cli.args.validate().is_err());

        let mut args = cli.args;
        args.signer_args = SignerArgs {
            key_file: Some(PathBuf::from("/tmp/key")),
            private_key: Some(KEY.to_string()),
        };
        assert_eq!(
            args.validate().unwrap_err(),
            "Cannot specify more than one signer key source"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let args = SignerArgs { key_file: None, private_key: Some("0x1234".to_string()) };
        assert!(args.signer().is_err());
        assert!(SignerArgs::default().signer().unwrap().is_none());
    }
}
