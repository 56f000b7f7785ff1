//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_bin;

use std::sync::Arc;

use quotebin::{Config, KeyValueStore, MemoryStore};

pub const TEST_ACCESS_KEY: &str = "test-api-key";
pub const TEST_BIN_ID: &str = "test-bin-id";

/// Configuration pointing at a mock bin server.
pub fn test_config(base_url: &str, bin_id: Option<&str>) -> Config {
    Config {
        base_url: base_url.to_string(),
        access_key: Some(TEST_ACCESS_KEY.to_string()),
        bin_id: bin_id.map(str::to_string),
        ..Config::default()
    }
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}
