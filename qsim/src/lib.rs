//! Single-server queue and (s, S) inventory simulations.
//!
//! Both models run on the [`desim`] engine: [`queueing::SingleServerQueue`] serves customers in
//! FIFO order until a requested number of delays has been observed, and
//! [`inventory::InventorySystem`] evaluates one reorder policy over a fixed horizon.

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

pub mod config;
pub use config::{load, ConfigError, InventoryParams, Parameters, Policy, QueueParams};

pub mod queueing;
pub use queueing::{run_queue, CustomerId, QueueSummary, ServerStatus, SingleServerQueue};

pub mod inventory;
pub use inventory::{InventoryRunner, InventorySystem, PolicyReport};

pub mod report;

mod logging;
pub use logging::set_up_logger;
