//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the accounting core and manages runtime behavior:
//! - Limiter registry (per-asset configuration and window state)
//! - Protection gateway (admission guards, settlement orchestration)
//! - Flow metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters and external collaborators implement. This keeps the
//! application layer independent from infrastructure details.

pub mod error;
pub mod gateway;
pub mod metrics;
pub mod ports;
pub mod registry;

pub use error::FirewallError;
pub use gateway::ProtectionGateway;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{
    Clock, RecoveryPort, SettlementHook, Storage, TransferError, TransferIntent, TransferPort,
};
pub use registry::{LimiterRegistry, WindowGeometry};
