//! Constants used in the placement deploy scripts

/// The name of the token contract artifact
pub const TOKEN_CONTRACT_NAME: &str = "NafenToken";

/// The name of the private placement contract artifact
pub const PLACEMENT_CONTRACT_NAME: &str = "PrivatePlacement";

/// The number of tranches in the placement schedule
pub const NUM_TRANCHES: usize = 3;

/// The offset of each tranche's start time from the schedule's base time, in seconds
pub const DEFAULT_TRANCHE_OFFSETS: [u64; NUM_TRANCHES] = [0, 240, 480];

/// The duration of each tranche, in seconds
pub const DEFAULT_TRANCHE_DURATIONS: [u64; NUM_TRANCHES] = [180, 180, 180];

/// The rate (or cap) value passed for each tranche
pub const DEFAULT_TRANCHE_RATES: [u64; NUM_TRANCHES] = [180, 180, 180];

/// The number of confirmations to wait for a contract deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The default RPC URL, a local devnet node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default directory in which compiled contract artifacts are found
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The key under which the schedule's base time is recorded in the `deployments.json` file
pub const BASE_TIME_KEY: &str = "placement_base_time";
