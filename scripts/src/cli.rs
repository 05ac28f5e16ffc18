//! Definitions of CLI arguments and commands for the placement deploy scripts

use std::path::{Path, PathBuf};

use alloy::{primitives::Address, providers::DynProvider};
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy, deploy_placement, deploy_token, print_schedule},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_RPC_URL, NUM_DEPLOY_CONFIRMATIONS,
    },
    errors::ScriptError,
    types::PlacementLayout,
    utils::{setup_client, signer_address},
};

/// Deploy the token and private placement contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer, required by every command that deploys
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to the file in which deployed addresses are recorded
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the token, then the placement bound to it
    Deploy(DeployArgs),
    /// Deploy only the token
    DeployToken(ArtifactArgs),
    /// Deploy the placement against an already deployed token
    DeployPlacement(DeployPlacementArgs),
    /// Print the placement constructor arguments without deploying anything.
    ///
    /// Needs no RPC connection. A private key, if given, only supplies the
    /// default owner
    Schedule(PrintScheduleArgs),
}

impl Command {
    /// Run the command, setting up a signing client only if it deploys
    pub async fn run(
        self,
        priv_key: Option<&str>,
        rpc_url: &str,
        deployments_path: &Path,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Schedule(args) => {
                let default_owner = priv_key.map(signer_address).transpose()?;
                print_schedule(args, default_owner, deployments_path)
            }
            command => {
                let priv_key = priv_key.ok_or_else(|| {
                    ScriptError::ClientInitialization(
                        "a private key is required to deploy, pass `--priv-key` or set `PKEY`"
                            .to_string(),
                    )
                })?;
                let (client, deployer_address) = setup_client(priv_key, rpc_url)?;
                command
                    .run_with_client(client, deployer_address, deployments_path)
                    .await
            }
        }
    }

    /// Run the command, deploying from `deployer_address` through `client`
    pub async fn run_with_client(
        self,
        client: DynProvider,
        deployer_address: Address,
        deployments_path: &Path,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, client, deployer_address, deployments_path).await,
            Command::DeployToken(args) => {
                deploy_token(args, client, deployer_address, deployments_path).await
            }
            Command::DeployPlacement(args) => {
                deploy_placement(args, client, deployer_address, deployments_path).await
            }
            Command::Schedule(args) => {
                print_schedule(args, Some(deployer_address), deployments_path)
            }
        }
    }
}

/// Arguments determining the placement schedule and constructor signature
#[derive(Args)]
pub struct ScheduleArgs {
    /// The unix time, in seconds, from which tranche start times are offset.
    ///
    /// Defaults to the time recorded in the deployments file when resuming,
    /// or to the current time otherwise
    #[arg(short, long, env = "BASE_TIME")]
    pub base_time: Option<u64>,

    /// Address of the placement owner, defaults to the deployer
    #[arg(short, long)]
    pub owner: Option<String>,

    /// The placement constructor signature
    #[arg(short, long, value_enum, default_value_t = PlacementLayout::default())]
    pub layout: PlacementLayout,
}

/// Arguments controlling how contracts are instantiated
#[derive(Args)]
pub struct ArtifactArgs {
    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Number of confirmations to wait for on each deployment
    #[arg(short, long, default_value_t = NUM_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,
}

/// Deploy the full token + placement plan
#[derive(Args)]
pub struct DeployArgs {
    /// The schedule arguments
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// The artifact arguments
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Deploy the placement contract against an existing token
#[derive(Args)]
pub struct DeployPlacementArgs {
    /// Token contract address in hex, defaults to the one in the deployments file
    #[arg(short, long)]
    pub token: Option<String>,

    /// The schedule arguments
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// The artifact arguments
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Print the placement constructor arguments
#[derive(Args)]
pub struct PrintScheduleArgs {
    /// Token contract address in hex, defaults to the one in the deployments file
    #[arg(short, long)]
    pub token: Option<String>,

    /// The schedule arguments
    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use crate::{constants::DEFAULT_RPC_URL, errors::ScriptError};

    use super::Cli;

    #[tokio::test]
    async fn test_schedule_needs_no_key() {
        let dir = tempdir().unwrap();
        let deployments_path = dir.path().join("deployments.json");

        let Cli { command, .. } =
            Cli::try_parse_from(["placement-scripts", "schedule", "--base-time", "100"]).unwrap();
        command.run(None, DEFAULT_RPC_URL, &deployments_path).await.unwrap();
    }

    #[tokio::test]
    async fn test_deploy_requires_key() {
        let dir = tempdir().unwrap();
        let deployments_path = dir.path().join("deployments.json");

        let Cli { command, .. } =
            Cli::try_parse_from(["placement-scripts", "deploy-token"]).unwrap();
        let res = command.run(None, DEFAULT_RPC_URL, &deployments_path).await;

        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
        assert!(!deployments_path.exists());
    }
}
