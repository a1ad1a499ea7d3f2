//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the
//! application layer needs. Infrastructure adapters implement these ports:
//! the clock and limiter storage are process-local concerns, while the
//! transfer primitive and the recovery module are the external collaborators
//! specified only at their boundary.

use crate::domain::asset::Address;
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Window rotation is computed lazily from elapsed wall-clock time at the
/// moment a call arrives; abstracting the clock keeps that logic
/// deterministic under test.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent keyed storage of limiter records.
///
/// Infrastructure provides concrete implementations (`ShardedStorage`).
/// Entry access is closure-based so each per-asset mutation runs as a single
/// unit under the entry lock.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Insert `value` only if `key` is absent.
    ///
    /// Returns `false`, leaving the existing entry untouched, when the key is
    /// already present.
    fn insert_if_absent(&self, key: K, value: V) -> bool;

    /// Mutable access to an existing entry; `None` when absent.
    fn with_entry_mut<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Shared access to an existing entry; `None` when absent.
    fn with_entry<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the storage is empty.
    fn is_empty(&self) -> bool;

    /// Iterate over all entries.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);
}

/// A typed description of an intended transfer, carried alongside every
/// outflow report and handed to the recovery collaborator on diversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferIntent {
    /// The originally intended recipient.
    pub recipient: Address,
    /// The amount to move.
    pub amount: u128,
}

/// Opaque failure of the asset transfer primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferError {
    reason: String,
}

impl TransferError {
    /// Wrap a transfer failure reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer failed: {}", self.reason)
    }
}

impl std::error::Error for TransferError {}

/// Port for the asset transfer primitive.
///
/// Used both for normal payout and for diverting funds to the recovery
/// module. Funds are assumed to already sit in custody before any outflow
/// report; the firewall only directs where they go next.
pub trait TransferPort: Send + Sync {
    /// Standard token transfer.
    fn transfer_token(&self, token: Address, to: Address, amount: u128)
        -> Result<(), TransferError>;

    /// Native-currency value transfer.
    fn transfer_native(&self, to: Address, amount: u128) -> Result<(), TransferError>;
}

/// Port for the recovery collaborator.
///
/// Accepts custody of diverted funds together with the intended transfer so
/// it can later arbitrate or release them. Its internal resolution logic is
/// out of scope.
pub trait RecoveryPort: Send + Sync {
    /// Register a hold on a diverted transfer.
    fn hold_transfer(&self, asset: Address, intent: &TransferIntent) -> Result<(), TransferError>;
}

/// Per-asset-class fund movement, invoked by the gateway after the
/// accounting commit.
///
/// Implemented by distinct adapter variants (token, native) selected by the
/// reporting entry point; this keeps accounting generic and fund movement
/// asset-specific.
pub trait SettlementHook: Send + Sync {
    /// Pay the intended recipient (the trigger did not fire).
    fn deliver(&self, asset: Address, intent: &TransferIntent) -> Result<(), TransferError>;

    /// The trigger fired: route the disputed amount to `recovery` and
    /// register the hold with the recovery collaborator.
    fn on_firewall_trigger(
        &self,
        asset: Address,
        recovery: Address,
        intent: &TransferIntent,
    ) -> Result<(), TransferError>;
}
