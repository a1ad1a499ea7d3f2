//! Mock implementations for testing.
//!
//! Test doubles for the clock and the external collaborators, enabling
//! deterministic tests of rotation, diversion, and rollback behavior.

pub mod clock;
pub mod recovery;
pub mod vault;

pub use clock::MockClock;
pub use recovery::{HeldTransfer, MockRecovery};
pub use vault::{MockVault, RecordedTransfer};
