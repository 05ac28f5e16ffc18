//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use clap::ValueEnum;

/// A single positional constructor argument
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A Solidity `address`
    Address(Address),
    /// A Solidity `uint256`
    Uint(U256),
}

impl ConstructorArg {
    /// Construct a `uint256` argument from a `u64`
    pub fn uint(value: u64) -> Self {
        ConstructorArg::Uint(U256::from(value))
    }
}

impl From<ConstructorArg> for DynSolValue {
    fn from(arg: ConstructorArg) -> Self {
        match arg {
            ConstructorArg::Address(address) => DynSolValue::Address(address),
            ConstructorArg::Uint(value) => DynSolValue::Uint(value, 256),
        }
    }
}

impl Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Address(address) => write!(f, "{address:#x}"),
            ConstructorArg::Uint(value) => write!(f, "{value}"),
        }
    }
}

/// A request to instantiate a contract: the artifact name and its
/// positional constructor arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractSpec {
    /// The name of the contract artifact
    pub name: String,
    /// The constructor arguments, in positional order
    pub args: Vec<ConstructorArg>,
}

impl ContractSpec {
    /// A spec for a contract whose constructor takes no arguments
    pub fn without_args(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// ABI-encode the constructor arguments, to be appended to the creation bytecode
    pub fn encode_args(&self) -> Vec<u8> {
        if self.args.is_empty() {
            return Vec::new();
        }

        let values = self.args.iter().copied().map(DynSolValue::from).collect();
        DynSolValue::Tuple(values).abi_encode_params()
    }
}

/// A contract that has been instantiated on-chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The name of the contract artifact
    pub name: String,
    /// The address at which the contract was deployed
    pub address: Address,
}

/// The constructor signatures of the private placement contract
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlacementLayout {
    /// `(token, t1_start, t1_duration, t1_rate, .., t3_start, t3_duration, t3_rate)`
    #[default]
    Rated,
    /// `(token, owner, t1_start, t1_duration, .., t3_start, t3_duration)`
    Owned,
}

impl Display for PlacementLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementLayout::Rated => write!(f, "rated"),
            PlacementLayout::Owned => write!(f, "owned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use super::{ConstructorArg, ContractSpec};

    #[test]
    fn test_encode_no_args() {
        let spec = ContractSpec::without_args("NafenToken");
        assert!(spec.encode_args().is_empty());
    }

    #[test]
    fn test_encode_args_are_word_aligned() {
        let token = Address::with_last_byte(0xaa);
        let spec = ContractSpec {
            name: "PrivatePlacement".to_string(),
            args: vec![ConstructorArg::Address(token), ConstructorArg::uint(180)],
        };

        let encoded = spec.encode_args();
        assert_eq!(encoded.len(), 64);

        // Addresses are left-padded to a full word
        assert_eq!(&encoded[12..32], token.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(180u64));
    }
}
