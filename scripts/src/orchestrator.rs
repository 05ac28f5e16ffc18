//! Sequencing of the token and placement deployments.
//!
//! The placement contract's constructor consumes the token's deployed address,
//! so the token is always deployed first. A failed step aborts the rest of the
//! plan and nothing is rolled back: a token deployed before a failed placement
//! stays deployed, and running the plan again deploys a fresh token.

use alloy::primitives::Address;
use tracing::{error, info, warn};

use crate::{
    constants::{PLACEMENT_CONTRACT_NAME, TOKEN_CONTRACT_NAME},
    deployer::ContractDeployer,
    errors::ScriptError,
    schedule::TrancheSchedule,
    types::{ConstructorArg, ContractSpec, DeployedContract, PlacementLayout},
};

// --------
// | Plan |
// --------

/// The parameters of one token + placement deployment
#[derive(Clone, Debug)]
pub struct DeploymentPlan {
    /// The name of the token contract artifact
    pub token_contract: String,
    /// The name of the placement contract artifact
    pub placement_contract: String,
    /// The account owning the placement, only passed under [`PlacementLayout::Owned`]
    pub owner: Address,
    /// The tranche schedule passed to the placement constructor
    pub schedule: TrancheSchedule,
    /// The placement constructor's signature
    pub layout: PlacementLayout,
}

impl DeploymentPlan {
    /// A plan for the default token and placement artifacts
    pub fn new(owner: Address, schedule: TrancheSchedule, layout: PlacementLayout) -> Self {
        Self {
            token_contract: TOKEN_CONTRACT_NAME.to_string(),
            placement_contract: PLACEMENT_CONTRACT_NAME.to_string(),
            owner,
            schedule,
            layout,
        }
    }

    /// The token deployment, which takes no constructor arguments
    pub fn token_spec(&self) -> ContractSpec {
        ContractSpec::without_args(&self.token_contract)
    }

    /// The placement deployment, bound to an already deployed token
    pub fn placement_spec(&self, token: &DeployedContract) -> ContractSpec {
        ContractSpec {
            name: self.placement_contract.clone(),
            args: self.placement_args(token.address),
        }
    }

    /// The placement constructor arguments, flattened positionally
    pub fn placement_args(&self, token_address: Address) -> Vec<ConstructorArg> {
        let mut args = vec![ConstructorArg::Address(token_address)];
        if self.layout == PlacementLayout::Owned {
            args.push(ConstructorArg::Address(self.owner));
        }

        for tranche in self.schedule.tranches() {
            args.push(ConstructorArg::uint(tranche.start));
            args.push(ConstructorArg::uint(tranche.duration));
            if self.layout == PlacementLayout::Rated {
                args.push(ConstructorArg::Uint(tranche.rate));
            }
        }

        args
    }
}

// ---------
// | State |
// ---------

/// The progress of a plan through its deployments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentState {
    /// Nothing has been deployed yet
    NotStarted,
    /// The token is deployed, the placement is not
    TokenDeployed {
        /// The deployed token
        token: DeployedContract,
    },
    /// Both contracts are deployed
    PlacementDeployed {
        /// The deployed token
        token: DeployedContract,
        /// The deployed placement
        placement: DeployedContract,
    },
    /// A step failed and the plan was aborted
    Failed {
        /// The token, if it was deployed before the failure
        token: Option<DeployedContract>,
        /// The error that aborted the plan
        reason: String,
    },
}

impl DeploymentState {
    /// Whether no further steps may run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::PlacementDeployed { .. } | DeploymentState::Failed { .. }
        )
    }

    /// The deployed token, if any
    pub fn token(&self) -> Option<&DeployedContract> {
        match self {
            DeploymentState::NotStarted => None,
            DeploymentState::TokenDeployed { token }
            | DeploymentState::PlacementDeployed { token, .. } => Some(token),
            DeploymentState::Failed { token, .. } => token.as_ref(),
        }
    }
}

/// The contracts deployed by a successful run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentOutcome {
    /// The deployed token
    pub token: DeployedContract,
    /// The deployed placement
    pub placement: DeployedContract,
}

// ----------------
// | Orchestrator |
// ----------------

/// Drives a [`DeploymentPlan`] through a [`ContractDeployer`]
pub struct DeploymentOrchestrator<D> {
    /// The capability used to instantiate contracts
    deployer: D,
    /// The plan being executed
    plan: DeploymentPlan,
    /// How far the plan has progressed
    state: DeploymentState,
}

impl<D: ContractDeployer> DeploymentOrchestrator<D> {
    /// An orchestrator for a plan that has not started
    pub fn new(deployer: D, plan: DeploymentPlan) -> Self {
        Self {
            deployer,
            plan,
            state: DeploymentState::NotStarted,
        }
    }

    /// An orchestrator resuming a plan whose token is already deployed
    pub fn with_deployed_token(deployer: D, plan: DeploymentPlan, token: DeployedContract) -> Self {
        Self {
            deployer,
            plan,
            state: DeploymentState::TokenDeployed { token },
        }
    }

    /// The current state of the plan
    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Deploy the token contract
    pub async fn deploy_token(&mut self) -> Result<DeployedContract, ScriptError> {
        if self.state != DeploymentState::NotStarted {
            return Err(ScriptError::InvalidState(format!(
                "cannot deploy token in state {:?}",
                self.state
            )));
        }

        let spec = self.plan.token_spec();
        match self.deployer.deploy(&spec).await {
            Ok(token) => {
                info!("Token `{}` deployed at {:#x}", token.name, token.address);
                self.state = DeploymentState::TokenDeployed {
                    token: token.clone(),
                };
                Ok(token)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Deploy the placement contract against the token at `token_address`.
    ///
    /// The token must have been deployed (or supplied) to this orchestrator first.
    /// Referencing any other token aborts the plan.
    pub async fn deploy_placement(
        &mut self,
        token_address: Address,
    ) -> Result<DeployedContract, ScriptError> {
        let token = match &self.state {
            DeploymentState::TokenDeployed { token } if token.address == token_address => {
                token.clone()
            }
            DeploymentState::TokenDeployed { token } => {
                let err = ScriptError::DependencyUnresolved(format!(
                    "placement references token {:#x}, but `{}` was deployed at {:#x}",
                    token_address, token.name, token.address
                ));
                return Err(self.fail(err));
            }
            DeploymentState::NotStarted => {
                let err = ScriptError::DependencyUnresolved(format!(
                    "placement references token {:#x} before the token was deployed",
                    token_address
                ));
                return Err(self.fail(err));
            }
            state => {
                return Err(ScriptError::InvalidState(format!(
                    "cannot deploy placement in state {:?}",
                    state
                )));
            }
        };

        let spec = self.plan.placement_spec(&token);
        info!(
            "Deploying `{}` with args ({})",
            spec.name,
            spec.args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        match self.deployer.deploy(&spec).await {
            Ok(placement) => {
                info!(
                    "Placement `{}` deployed at {:#x}",
                    placement.name, placement.address
                );
                self.state = DeploymentState::PlacementDeployed {
                    token,
                    placement: placement.clone(),
                };
                Ok(placement)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Deploy the token, then the placement bound to it
    pub async fn run(&mut self) -> Result<DeploymentOutcome, ScriptError> {
        let token = self.deploy_token().await?;
        let placement = self.deploy_placement(token.address).await?;
        Ok(DeploymentOutcome { token, placement })
    }

    /// Abort the plan with the given error
    fn fail(&mut self, err: ScriptError) -> ScriptError {
        let token = self.state.token().cloned();
        if let Some(token) = &token {
            warn!(
                "Token `{}` remains deployed at {:#x} with no placement",
                token.name, token.address
            );
        }

        error!("Deployment aborted: {}", err);
        self.state = DeploymentState::Failed {
            token,
            reason: err.to_string(),
        };
        err
    }
}
