//! Deploying contracts and talking to deployed instances.
//!
//! The [`ContractFactory`] is the entry point: it turns an interface
//! descriptor plus creation bytecode into a submitted deployment and
//! hands out [`ContractInstance`] handles whose callable surface is
//! bound from the descriptor. Confirmation is observed by a bounded
//! block-tick watch, see the `confirm` module.

mod binding;
mod confirm;
mod deploy;
mod instance;

pub use {
  binding::{BoundEvent, BoundFunction, CallError, EventFilter},
  confirm::WATCH_BLOCKS,
  deploy::{
    ContractFactory,
    DeployError,
    DeployEvent,
    DeployOptions,
    PendingDeployment,
  },
  instance::ContractInstance,
};
