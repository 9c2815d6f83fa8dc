//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Region used when no override is provided.
pub const DEFAULT_REGION: &str = "GRA1";

/// Flavor used when no override is provided.
pub const DEFAULT_FLAVOR: &str = "vps-ssd-1";

/// Image used when no override is provided.
pub const DEFAULT_IMAGE: &str = "Ubuntu 14.04";
