//! DataHub catalog provider
//!
//! Reads entity metadata and writes edits through DataHub's GraphQL API.

pub mod client;
pub mod types;

pub use client::{DataHubClient, DataHubConfig};
