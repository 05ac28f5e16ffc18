//! Definitions of errors that can occur during the execution of the placement deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the placement deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// Error parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing constructor arguments or calldata
    CalldataConstruction(String),
    /// A deployment referenced a contract address that has not been deployed yet
    DependencyUnresolved(String),
    /// A contract constructor reverted on-chain
    ConstructorRevert(String),
    /// Error deploying a contract, e.g. a transport or gas failure
    ContractDeployment(String),
    /// An orchestrator step was invoked in a state that does not permit it
    InvalidState(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::DependencyUnresolved(s) => {
                write!(f, "unresolved deployment dependency: {}", s)
            }
            ScriptError::ConstructorRevert(s) => write!(f, "constructor reverted: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::InvalidState(s) => write!(f, "invalid deployment state: {}", s),
        }
    }
}

impl Error for ScriptError {}
