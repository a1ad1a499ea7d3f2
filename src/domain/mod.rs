//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the firewall:
//! - Asset identity (addresses, deterministic identifiers)
//! - Sliding-window liquidity accounting
//! - Per-asset limiter records and the drawdown trigger rule
//!
//! All types in this layer are pure and easily testable.

pub mod asset;
pub mod limiter;
pub mod window;

pub use asset::{Address, AssetId};
pub use limiter::{FlowOutcome, LimitStatus, Limiter, LimiterParams, BPS_DENOMINATOR};
pub use window::{Bucket, FlowWindow};
