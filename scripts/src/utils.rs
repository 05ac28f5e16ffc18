//! Utilities for the deploy scripts.

use std::{
    fs,
    path::Path,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use serde_json::{Map, Value};

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// Sets up the signing client through which contracts are deployed,
/// returning it alongside the address of the deploying account
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(DynProvider, Address), ScriptError> {
    let signer = parse_signer(priv_key)?;
    let deployer_address = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok((DynProvider::new(provider), deployer_address))
}

/// The address of the account controlled by `priv_key`
pub fn signer_address(priv_key: &str) -> Result<Address, ScriptError> {
    Ok(parse_signer(priv_key)?.address())
}

/// Parse a hex-encoded private key into a local signer
fn parse_signer(priv_key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Parse a hex-encoded address passed on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// The current unix time, in seconds
pub fn current_unix_time() -> Result<u64, ScriptError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

// ---------------
// | Deployments |
// ---------------

/// Read the deployments file, treating a missing file as empty
fn read_deployments_json(file_path: &Path) -> Result<Value, ScriptError> {
    if !file_path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents =
        fs::read_to_string(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Read a value recorded under `key` in the deployments file
pub fn read_deployment_value(file_path: &Path, key: &str) -> Result<Option<Value>, ScriptError> {
    let json = read_deployments_json(file_path)?;
    Ok(json
        .get(DEPLOYMENTS_KEY)
        .and_then(|deployments| deployments.get(key))
        .cloned())
}

/// Read a deployed contract's address from the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &Path,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let value = read_deployment_value(file_path, contract_key)?.ok_or_else(|| {
        ScriptError::ReadDeployments(format!("key {} not found in deployments file", contract_key))
    })?;

    let addr_str = value.as_str().ok_or_else(|| {
        ScriptError::ReadDeployments(format!("{} is not an address string", contract_key))
    })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record `value` under `key` in the deployments file, creating it if need be
pub fn write_deployment_value(
    file_path: &Path,
    key: &str,
    value: Value,
) -> Result<(), ScriptError> {
    let mut json = read_deployments_json(file_path)?;

    let root = json.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments("deployments file is not a JSON object".to_string())
    })?;
    let deployments = root
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!("`{}` is not a JSON object", DEPLOYMENTS_KEY))
        })?;
    deployments.insert(key.to_string(), value);

    let contents = serde_json::to_string_pretty(&json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Record a deployed contract's address in the deployments file
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    write_deployment_value(
        file_path,
        contract_key,
        Value::String(format!("{address:#x}")),
    )
}
