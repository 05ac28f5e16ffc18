//! Implementations of the various deploy scripts

use std::path::Path;

use alloy::{primitives::Address, providers::DynProvider};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    cli::{ArtifactArgs, DeployArgs, DeployPlacementArgs, PrintScheduleArgs, ScheduleArgs},
    constants::{BASE_TIME_KEY, TOKEN_CONTRACT_NAME},
    deployer::{ContractDeployer, RpcDeployer},
    errors::ScriptError,
    orchestrator::{DeploymentOrchestrator, DeploymentPlan, DeploymentState},
    schedule::{ScheduleConfig, TrancheSchedule},
    types::{ContractSpec, DeployedContract, PlacementLayout},
    utils::{
        current_unix_time, parse_addr_from_deployments_file, parse_address, read_deployment_value,
        write_deployed_address, write_deployment_value,
    },
};

/// Deploy the token, then the placement bound to it
pub async fn deploy(
    args: DeployArgs,
    client: DynProvider,
    deployer_address: Address,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    // A fresh run never reuses a recorded base time
    let base_time = resolve_base_time(args.schedule.base_time, None)?;
    let plan = build_plan(&args.schedule, base_time, deployer_address)?;
    write_deployment_value(deployments_path, BASE_TIME_KEY, Value::from(base_time))?;

    let deployer = rpc_deployer(client, deployer_address, args.artifacts);
    let mut orchestrator = DeploymentOrchestrator::new(deployer, plan);
    let res = orchestrator.run().await;

    // Record whatever made it on-chain, including a token left behind by a failed placement
    record_deployments(deployments_path, orchestrator.state())?;
    let outcome = res?;

    info!("Token deployed at {:#x}", outcome.token.address);
    info!("Placement deployed at {:#x}", outcome.placement.address);
    Ok(())
}

/// Deploy only the token
pub async fn deploy_token(
    args: ArtifactArgs,
    client: DynProvider,
    deployer_address: Address,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let deployer = rpc_deployer(client, deployer_address, args);
    let token = deployer
        .deploy(&ContractSpec::without_args(TOKEN_CONTRACT_NAME))
        .await?;

    write_deployed_address(deployments_path, &token.name, token.address)?;
    info!("Token deployed at {:#x}", token.address);
    Ok(())
}

/// Deploy the placement against an already deployed token
pub async fn deploy_placement(
    args: DeployPlacementArgs,
    client: DynProvider,
    deployer_address: Address,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let token = DeployedContract {
        name: TOKEN_CONTRACT_NAME.to_string(),
        address: resolve_token_address(args.token.as_deref(), deployments_path)?,
    };

    let base_time = resolve_base_time(
        args.schedule.base_time,
        recorded_base_time(deployments_path)?,
    )?;
    let plan = build_plan(&args.schedule, base_time, deployer_address)?;
    write_deployment_value(deployments_path, BASE_TIME_KEY, Value::from(base_time))?;

    let deployer = rpc_deployer(client, deployer_address, args.artifacts);
    let token_address = token.address;
    let mut orchestrator = DeploymentOrchestrator::with_deployed_token(deployer, plan, token);
    let placement = orchestrator.deploy_placement(token_address).await?;

    write_deployed_address(deployments_path, &placement.name, placement.address)?;
    info!("Placement deployed at {:#x}", placement.address);
    Ok(())
}

/// Print the placement constructor arguments without deploying anything
pub fn print_schedule(
    args: PrintScheduleArgs,
    default_owner: Option<Address>,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let token_address = match resolve_token_address(args.token.as_deref(), deployments_path) {
        Ok(address) => address,
        Err(e) => {
            warn!("No token address ({}), using the zero address", e);
            Address::ZERO
        }
    };

    let base_time = resolve_base_time(
        args.schedule.base_time,
        recorded_base_time(deployments_path)?,
    )?;
    let default_owner = default_owner.unwrap_or_else(|| {
        if args.schedule.layout == PlacementLayout::Owned && args.schedule.owner.is_none() {
            warn!("No owner or private key given, using the zero address as owner");
        }
        Address::ZERO
    });
    let plan = build_plan(&args.schedule, base_time, default_owner)?;

    println!("{} ({} layout)", plan.placement_contract, plan.layout);
    for (i, arg) in plan.placement_args(token_address).iter().enumerate() {
        println!("\t{}: {}", i, arg);
    }

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Build the deployment plan described by the schedule arguments
fn build_plan(
    args: &ScheduleArgs,
    base_time: u64,
    default_owner: Address,
) -> Result<DeploymentPlan, ScriptError> {
    let owner = args
        .owner
        .as_deref()
        .map(parse_address)
        .transpose()?
        .unwrap_or(default_owner);

    let schedule = TrancheSchedule::from_base(base_time, &ScheduleConfig::default())?;
    for (i, tranche) in schedule.tranches().iter().enumerate() {
        info!(
            "Tranche {}: start {}, duration {}, rate {}",
            i + 1,
            tranche.start,
            tranche.duration,
            tranche.rate
        );
    }

    Ok(DeploymentPlan::new(owner, schedule, args.layout))
}

/// Pick the schedule's base time: an explicit one, else a recorded one, else now
fn resolve_base_time(explicit: Option<u64>, recorded: Option<u64>) -> Result<u64, ScriptError> {
    if let Some(base_time) = explicit.or(recorded) {
        return Ok(base_time);
    }

    let now = current_unix_time()?;
    warn!(
        "No base time given, using the current time {}; pass `--base-time {}` to reproduce it",
        now, now
    );
    Ok(now)
}

/// The base time recorded by a previous run, if any
fn recorded_base_time(deployments_path: &Path) -> Result<Option<u64>, ScriptError> {
    Ok(read_deployment_value(deployments_path, BASE_TIME_KEY)?.and_then(|v| v.as_u64()))
}

/// The token address given on the command line, else the recorded one
fn resolve_token_address(
    token: Option<&str>,
    deployments_path: &Path,
) -> Result<Address, ScriptError> {
    match token {
        Some(token) => parse_address(token),
        None => parse_addr_from_deployments_file(deployments_path, TOKEN_CONTRACT_NAME),
    }
}

/// Construct an RPC-backed deployer from the artifact arguments
fn rpc_deployer(client: DynProvider, deployer_address: Address, args: ArtifactArgs) -> RpcDeployer {
    RpcDeployer::new(
        client,
        deployer_address,
        args.artifacts_dir,
        args.confirmations,
    )
}

/// Write the addresses of the contracts deployed so far to the deployments file
fn record_deployments(deployments_path: &Path, state: &DeploymentState) -> Result<(), ScriptError> {
    if let Some(token) = state.token() {
        write_deployed_address(deployments_path, &token.name, token.address)?;
    }

    if let DeploymentState::PlacementDeployed { placement, .. } = state {
        write_deployed_address(deployments_path, &placement.name, placement.address)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use tempfile::tempdir;

    use crate::{
        constants::{PLACEMENT_CONTRACT_NAME, TOKEN_CONTRACT_NAME},
        orchestrator::DeploymentState,
        types::DeployedContract,
        utils::{parse_addr_from_deployments_file, read_deployment_value},
    };

    use super::{record_deployments, resolve_base_time};

    #[test]
    fn test_explicit_base_time_wins() {
        assert_eq!(resolve_base_time(Some(10), Some(20)).unwrap(), 10);
        assert_eq!(resolve_base_time(None, Some(20)).unwrap(), 20);
        assert!(resolve_base_time(None, None).unwrap() > 0);
    }

    #[test]
    fn test_failed_run_records_token_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let token = DeployedContract {
            name: TOKEN_CONTRACT_NAME.to_string(),
            address: Address::repeat_byte(0x33),
        };
        let state = DeploymentState::Failed {
            token: Some(token.clone()),
            reason: "constructor reverted".to_string(),
        };

        record_deployments(&path, &state).unwrap();

        assert_eq!(
            parse_addr_from_deployments_file(&path, TOKEN_CONTRACT_NAME).unwrap(),
            token.address
        );
        assert_eq!(
            read_deployment_value(&path, PLACEMENT_CONTRACT_NAME).unwrap(),
            None
        );
    }
}
