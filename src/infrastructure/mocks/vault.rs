//! Mock asset transfer primitive.

use crate::application::ports::{TransferError, TransferPort};
use crate::domain::asset::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// One executed transfer, as recorded by [`MockVault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedTransfer {
    /// Token address, or the native placeholder.
    pub asset: Address,
    pub to: Address,
    pub amount: u128,
}

/// In-memory transfer primitive that records every transfer and can be
/// switched into a failing mode to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MockVault {
    transfers: Mutex<Vec<RecordedTransfer>>,
    failing: AtomicBool,
}

impl MockVault {
    /// Create a vault that accepts every transfer.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, transfer: RecordedTransfer) -> Result<(), TransferError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TransferError::new("mock vault is failing"));
        }
        self.lock().push(transfer);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedTransfer>> {
        self.transfers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// All transfers executed so far, in order.
    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.lock().clone()
    }

    /// Total amount transferred to `to` for `asset`.
    pub fn total_sent(&self, asset: Address, to: Address) -> u128 {
        self.lock()
            .iter()
            .filter(|t| t.asset == asset && t.to == to)
            .map(|t| t.amount)
            .sum()
    }
}

impl TransferPort for MockVault {
    fn transfer_token(
        &self,
        token: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.record(RecordedTransfer {
            asset: token,
            to,
            amount,
        })
    }

    fn transfer_native(&self, to: Address, amount: u128) -> Result<(), TransferError> {
        self.record(RecordedTransfer {
            asset: Address::NATIVE,
            to,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_transfers_in_order() {
        let vault = MockVault::new();
        let token = Address::repeating(0x10);
        let alice = Address::repeating(0x20);

        vault.transfer_token(token, alice, 100).unwrap();
        vault.transfer_native(alice, 50).unwrap();

        let transfers = vault.transfers();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].asset, token);
        assert_eq!(transfers[1].asset, Address::NATIVE);
        assert_eq!(vault.total_sent(token, alice), 100);
    }

    #[test]
    fn failing_mode_rejects_transfers() {
        let vault = MockVault::new();
        vault.set_failing(true);
        assert!(vault
            .transfer_native(Address::repeating(0x20), 1)
            .is_err());
        assert!(vault.transfers().is_empty());

        vault.set_failing(false);
        assert!(vault.transfer_native(Address::repeating(0x20), 1).is_ok());
    }
}
