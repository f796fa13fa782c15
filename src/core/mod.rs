//! Core functionality modules
//!
//! This module contains the lookup logic organized into layers:
//! - `record`: The normalized result of a lookup
//! - `data`: Local persistence of records
//! - `providers`: Dictionary sources and their HTTP plumbing
//! - `lookup`: The cache-or-fetch pipeline tying them together

pub mod data;
pub mod lookup;
pub mod providers;
pub mod record;

// Re-export commonly used types for convenience
pub use data::CacheStore;
pub use lookup::{LookupOptions, LookupOutcome, LookupPipeline, Origin};
pub use providers::{HttpFetcher, Provider, ProviderKind};
