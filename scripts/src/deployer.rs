//! The deployer capability: resolving contract artifacts and instantiating
//! contracts on-chain

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{PoisonError, RwLock},
};

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
    transports::TransportError,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    constants::ARTIFACT_EXTENSION,
    errors::ScriptError,
    types::{ContractSpec, DeployedContract},
};

/// A capability that can instantiate contracts and remembers where it put them
#[allow(async_fn_in_trait)]
pub trait ContractDeployer {
    /// Instantiate the contract described by `spec`, resolving once the
    /// deployment is confirmed
    async fn deploy(&self, spec: &ContractSpec) -> Result<DeployedContract, ScriptError>;

    /// The address of the most recent deployment of the named contract, if any
    fn address_of(&self, name: &str) -> Option<Address>;
}

impl<T: ContractDeployer + ?Sized> ContractDeployer for &T {
    async fn deploy(&self, spec: &ContractSpec) -> Result<DeployedContract, ScriptError> {
        (**self).deploy(spec).await
    }

    fn address_of(&self, name: &str) -> Option<Address> {
        (**self).address_of(name)
    }
}

// -------------
// | Artifacts |
// -------------

/// The subset of a compiled contract artifact that we need
#[derive(Deserialize)]
struct Artifact {
    /// The creation bytecode of the contract
    bytecode: ArtifactBytecode,
}

/// Truffle emits the bytecode as a bare hex string, Foundry nests it under `object`
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// `"bytecode": "0x..."`
    Hex(String),
    /// `"bytecode": { "object": "0x..." }`
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

/// Parse the creation bytecode out of the contents of an artifact file
pub fn parse_artifact_bytecode(contents: &str) -> Result<Bytes, ScriptError> {
    let artifact: Artifact =
        serde_json::from_str(contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let hex = match artifact.bytecode {
        ArtifactBytecode::Hex(hex) => hex,
        ArtifactBytecode::Object { object } => object,
    };

    let bytecode =
        Bytes::from_str(&hex).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(
            "artifact has no creation bytecode".to_string(),
        ));
    }

    Ok(bytecode)
}

/// The path of the named contract's artifact within `artifacts_dir`
pub fn artifact_path(artifacts_dir: &Path, name: &str) -> PathBuf {
    artifacts_dir.join(name).with_extension(ARTIFACT_EXTENSION)
}

/// Read the creation bytecode of the named contract from `artifacts_dir`
pub fn read_artifact_bytecode(artifacts_dir: &Path, name: &str) -> Result<Bytes, ScriptError> {
    let path = artifact_path(artifacts_dir, name);
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

    parse_artifact_bytecode(&contents)
}

// ----------------
// | RPC Deployer |
// ----------------

/// A [`ContractDeployer`] that sends creation transactions through an RPC provider
pub struct RpcDeployer {
    /// The signing provider used to send transactions
    client: DynProvider,
    /// The address of the deploying account
    deployer_address: Address,
    /// The directory containing the compiled contract artifacts
    artifacts_dir: PathBuf,
    /// The number of confirmations to wait for on each deployment
    confirmations: u64,
    /// The addresses of the contracts deployed so far, keyed by name
    deployed: RwLock<HashMap<String, Address>>,
}

impl RpcDeployer {
    /// Create a deployer sending from `deployer_address` through `client`
    pub fn new(
        client: DynProvider,
        deployer_address: Address,
        artifacts_dir: PathBuf,
        confirmations: u64,
    ) -> Self {
        Self {
            client,
            deployer_address,
            artifacts_dir,
            confirmations,
            deployed: RwLock::new(HashMap::new()),
        }
    }
}

impl ContractDeployer for RpcDeployer {
    async fn deploy(&self, spec: &ContractSpec) -> Result<DeployedContract, ScriptError> {
        let bytecode = read_artifact_bytecode(&self.artifacts_dir, &spec.name)?;

        let mut deploy_code = bytecode.to_vec();
        deploy_code.extend(spec.encode_args());

        let tx = TransactionRequest::default()
            .with_from(self.deployer_address)
            .with_deploy_code(deploy_code);

        info!("Deploying `{}` from {:#x}", spec.name, self.deployer_address);
        let pending_tx = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| send_error(&spec.name, e))?;

        let receipt = pending_tx
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ConstructorRevert(format!(
                "`{}` reverted in tx {:#x}",
                spec.name, receipt.transaction_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "no contract address in receipt for tx {:#x}",
                receipt.transaction_hash
            ))
        })?;

        self.deployed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(spec.name.clone(), address);

        Ok(DeployedContract {
            name: spec.name.clone(),
            address,
        })
    }

    fn address_of(&self, name: &str) -> Option<Address> {
        self.deployed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }
}

/// Classify an error returned when submitting a creation transaction.
///
/// Gas estimation executes the constructor, so a revert surfaces here as an
/// error response rather than as a failed receipt.
fn send_error(name: &str, err: TransportError) -> ScriptError {
    match err {
        TransportError::ErrorResp(payload) if payload.message.contains("revert") => {
            ScriptError::ConstructorRevert(format!("`{}`: {}", name, payload.message))
        }
        err => ScriptError::ContractDeployment(format!("`{}`: {}", name, err)),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::tempdir;

    use crate::errors::ScriptError;

    use super::{artifact_path, parse_artifact_bytecode, read_artifact_bytecode};

    #[test]
    fn test_parse_truffle_artifact() {
        let contents = r#"{ "contractName": "NafenToken", "abi": [], "bytecode": "0x6080604052" }"#;
        let bytecode = parse_artifact_bytecode(contents).unwrap();
        assert_eq!(bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_parse_foundry_artifact() {
        let contents = r#"{ "abi": [], "bytecode": { "object": "0x6080", "linkReferences": {} } }"#;
        let bytecode = parse_artifact_bytecode(contents).unwrap();
        assert_eq!(bytecode.as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_parse_empty_bytecode() {
        let contents = r#"{ "bytecode": "0x" }"#;
        assert!(matches!(
            parse_artifact_bytecode(contents),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_parse_unlinked_bytecode() {
        // Unlinked library placeholders are not valid hex
        let contents = r#"{ "bytecode": "0x6080__$abcdef$__" }"#;
        assert!(matches!(
            parse_artifact_bytecode(contents),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_read_artifact_from_dir() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        fs::write(
            artifact_path(dir, "PrivatePlacement"),
            r#"{ "bytecode": "0x60806040" }"#,
        )
        .unwrap();

        let bytecode = read_artifact_bytecode(dir, "PrivatePlacement").unwrap();
        assert_eq!(bytecode.len(), 4);

        let missing = read_artifact_bytecode(dir, "NafenToken");
        assert!(matches!(missing, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_artifact_path() {
        let path = artifact_path(Path::new("build/contracts"), "NafenToken");
        assert_eq!(path, Path::new("build/contracts/NafenToken.json"));
    }
}
