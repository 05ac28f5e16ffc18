//! Scripts for deploying the token and private placement contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod orchestrator;
pub mod schedule;
pub mod types;
pub mod utils;
