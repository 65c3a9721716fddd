//! Common test utilities and helpers

use omegle::{SessionConfig, SessionOptions};
use std::path::Path;
use std::time::Duration;

/// Identity handed out by the mock `/start` endpoints
#[allow(dead_code)]
pub const TEST_CLIENT_ID: &str = "central2:x7sdf8s9df7s8dfs9d";

/// Load a response fixture
#[allow(dead_code)]
pub fn load_response_fixture(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join("responses")
        .join(format!("{}.json", name));

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to load response fixture '{}' from {:?}: {}",
            name, path, e
        )
    })
}

/// Session configuration pointed at a mock server
#[allow(dead_code)]
pub fn test_config(uri: &str, options: SessionOptions) -> SessionConfig {
    SessionConfig::builder()
        .host(uri)
        .timeout(Duration::from_secs(2))
        .build()
        .and_then(|config| config.apply(options))
        .expect("Failed to build test config")
}

/// Start reply carrying only a quoted identity
#[allow(dead_code)]
pub fn bare_start_reply() -> String {
    format!("\"{}\"", TEST_CLIENT_ID)
}

/// Form body the service expects for identity-only POSTs
#[allow(dead_code)]
pub fn id_form() -> String {
    format!("id={}", TEST_CLIENT_ID.replace(':', "%3A"))
}
