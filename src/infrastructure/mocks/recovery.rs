//! Mock recovery collaborator.

use crate::application::ports::{RecoveryPort, TransferError, TransferIntent};
use crate::domain::asset::Address;
use std::sync::{Mutex, MutexGuard};

/// One held transfer, as recorded by [`MockRecovery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldTransfer {
    /// Token address, or the native placeholder.
    pub asset: Address,
    /// The originally intended recipient.
    pub recipient: Address,
    pub amount: u128,
}

/// Recovery collaborator that records every hold so tests can assert on the
/// diverted intent.
#[derive(Debug, Default)]
pub struct MockRecovery {
    holds: Mutex<Vec<HeldTransfer>>,
}

impl MockRecovery {
    /// Create a recovery collaborator with no holds.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HeldTransfer>> {
        self.holds.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All holds registered so far, in order.
    pub fn holds(&self) -> Vec<HeldTransfer> {
        self.lock().clone()
    }
}

impl RecoveryPort for MockRecovery {
    fn hold_transfer(&self, asset: Address, intent: &TransferIntent) -> Result<(), TransferError> {
        self.lock().push(HeldTransfer {
            asset,
            recipient: intent.recipient,
            amount: intent.amount,
        });
        Ok(())
    }
}
