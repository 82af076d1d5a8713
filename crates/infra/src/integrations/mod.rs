//! External service integrations

pub mod evosus;

pub use evosus::{EvosusClient, SimulatedEvosus};
