//! Evosus ERP integration
//!
//! - `client`: [`EvosusClient`], the `ErpClient` adapter
//! - `simulation`: canned responses used in test mode
//! - `wire`: envelope and loose-value decoding

pub mod client;
pub mod simulation;
pub mod wire;

pub use client::EvosusClient;
pub use simulation::SimulatedEvosus;
