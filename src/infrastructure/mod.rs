//! Infrastructure layer - adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementation (sharded map)
//! - Asset adapters and the firewall builder

pub mod adapter;
pub mod clock;
pub mod storage;

/// Mock implementations for testing.
///
/// Available during test builds or with the `test-helpers` feature. To use
/// these mocks from an integration suite, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// flowguard = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
