//! Outbound HTTP

pub mod client;

pub use client::{Attempt, HttpClient, HttpClientBuilder};
