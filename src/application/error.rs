//! Typed failure conditions.
//!
//! Every variant aborts the whole call with no state change. A trigger is
//! never an error: a diverted outflow is a successful call whose funds took
//! the recovery route.

use crate::domain::asset::{Address, AssetId};
use std::fmt;

/// Failure conditions of the administrative and flow-reporting surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirewallError {
    /// Retention threshold outside `1..=10000` bps on register or update.
    InvalidMinimumLiquidityThreshold { bps: u16 },
    /// Duplicate registration of the same asset identifier.
    LimiterAlreadyInitialized { asset: AssetId },
    /// Flow report or parameter update for an asset that was never registered.
    LimiterNotInitialized { asset: AssetId },
    /// Caller is not the administrator (admin surface) or not a protected
    /// contract (flow surface).
    Unauthorized { caller: Address },
    /// The global pause is active on the flow-reporting surface.
    NotOperational,
    /// A raw value transfer to a recipient or the recovery collaborator
    /// failed; all accounting for the call was rolled back.
    NativeTransferFailed,
}

impl fmt::Display for FirewallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirewallError::InvalidMinimumLiquidityThreshold { bps } => {
                write!(
                    f,
                    "minimum liquidity threshold {bps} bps is outside the valid range 1..=10000"
                )
            }
            FirewallError::LimiterAlreadyInitialized { asset } => {
                write!(f, "limiter for asset {asset} is already initialized")
            }
            FirewallError::LimiterNotInitialized { asset } => {
                write!(f, "no limiter registered for asset {asset}")
            }
            FirewallError::Unauthorized { caller } => {
                write!(f, "caller {caller} is not authorized")
            }
            FirewallError::NotOperational => {
                write!(f, "the firewall is paused; flow reports are rejected")
            }
            FirewallError::NativeTransferFailed => {
                write!(f, "raw value transfer failed; the call was rolled back")
            }
        }
    }
}

impl std::error::Error for FirewallError {}
