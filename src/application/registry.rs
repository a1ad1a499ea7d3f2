//! Limiter registry: per-asset configuration, window state, and the
//! protected-caller set.
//!
//! All mutation of the registry's configuration is administrator-only. The
//! registry never touches a limiter's accumulated window history through the
//! administrative surface; the baseline changes only through validated flow
//! reporting or time-based rotation.

use crate::application::error::FirewallError;
use crate::application::ports::{Clock, Storage};
use crate::domain::asset::{Address, AssetId};
use crate::domain::limiter::{FlowOutcome, LimitStatus, Limiter, LimiterParams};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::debug;

/// Window geometry, fixed at construction for the lifetime of the
/// deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowGeometry {
    /// Total duration of the sliding window.
    pub withdrawal_period: Duration,
    /// Bucket granularity.
    pub tick_length: Duration,
}

impl WindowGeometry {
    /// Ring length: `withdrawal_period / tick_length`.
    pub fn bucket_count(&self) -> usize {
        let ticks = self.withdrawal_period.as_nanos() / self.tick_length.as_nanos().max(1);
        usize::try_from(ticks).unwrap_or(usize::MAX).max(1)
    }
}

/// Result of applying an outflow to a limiter, including what the gateway
/// needs to unwind exactly this call's delta on settlement failure.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutflowRecord {
    pub outcome: FlowOutcome,
    pub recovery: Address,
    /// Whether this outflow is the one that tripped the breaker.
    pub tripped: bool,
}

/// Registry owning all per-asset limiters and the protected-caller set.
///
/// Generic over the storage implementation; in production use
/// `Arc<ShardedStorage>`.
pub struct LimiterRegistry<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    geometry: WindowGeometry,
    owner: RwLock<Address>,
    protected: RwLock<HashSet<Address>>,
}

impl<S> LimiterRegistry<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    /// Create a registry with no registered assets and an empty
    /// protected-caller set.
    pub fn new(storage: S, clock: Arc<dyn Clock>, owner: Address, geometry: WindowGeometry) -> Self {
        Self {
            storage,
            clock,
            geometry,
            owner: RwLock::new(owner),
            protected: RwLock::new(HashSet::new()),
        }
    }

    // Poisoned locks carry no invariant worth dying for here; recover the
    // inner value.
    fn owner_read(&self) -> RwLockReadGuard<'_, Address> {
        self.owner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn owner_write(&self) -> RwLockWriteGuard<'_, Address> {
        self.owner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn protected_read(&self) -> RwLockReadGuard<'_, HashSet<Address>> {
        self.protected.read().unwrap_or_else(|e| e.into_inner())
    }

    fn protected_write(&self) -> RwLockWriteGuard<'_, HashSet<Address>> {
        self.protected.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Guard: `caller` must be the configured administrator.
    fn ensure_owner(&self, caller: Address) -> Result<(), FirewallError> {
        if *self.owner_read() == caller {
            Ok(())
        } else {
            Err(FirewallError::Unauthorized { caller })
        }
    }

    /// Register an asset, creating a fresh limiter with a zeroed window.
    ///
    /// Administrator-only. Fails with `LimiterAlreadyInitialized` when the
    /// identifier is present and `InvalidMinimumLiquidityThreshold` when the
    /// threshold is 0 or exceeds 10000 bps.
    pub fn register_asset(
        &self,
        caller: Address,
        asset: Address,
        params: LimiterParams,
    ) -> Result<AssetId, FirewallError> {
        self.ensure_owner(caller)?;
        if !params.threshold_is_valid() {
            return Err(FirewallError::InvalidMinimumLiquidityThreshold {
                bps: params.min_retained_bps,
            });
        }
        let id = AssetId::of(asset);
        let limiter = Limiter::new(
            params,
            self.geometry.bucket_count(),
            self.geometry.tick_length,
            self.clock.now(),
        );
        if !self.storage.insert_if_absent(id, limiter) {
            return Err(FirewallError::LimiterAlreadyInitialized { asset: id });
        }
        debug!(
            target: "flowguard::admin",
            asset = %id,
            address = %asset,
            min_retained_bps = params.min_retained_bps,
            "asset registered"
        );
        Ok(id)
    }

    /// Update an existing limiter's parameters.
    ///
    /// Administrator-only, same threshold validation as registration.
    /// Mutates configuration fields only; window history, baseline, and
    /// status are untouched. Updating an unregistered asset fails rather
    /// than silently creating one.
    pub fn update_asset_params(
        &self,
        caller: Address,
        asset: Address,
        params: LimiterParams,
    ) -> Result<(), FirewallError> {
        self.ensure_owner(caller)?;
        if !params.threshold_is_valid() {
            return Err(FirewallError::InvalidMinimumLiquidityThreshold {
                bps: params.min_retained_bps,
            });
        }
        let id = AssetId::of(asset);
        self.storage
            .with_entry_mut(&id, |limiter| limiter.set_params(params))
            .ok_or(FirewallError::LimiterNotInitialized { asset: id })?;
        debug!(
            target: "flowguard::admin",
            asset = %id,
            min_retained_bps = params.min_retained_bps,
            "asset parameters updated"
        );
        Ok(())
    }

    /// Add callers to the protected-contract allow-list. Idempotent.
    pub fn add_protected_contracts(
        &self,
        caller: Address,
        contracts: &[Address],
    ) -> Result<(), FirewallError> {
        self.ensure_owner(caller)?;
        let mut set = self.protected_write();
        for contract in contracts {
            set.insert(*contract);
        }
        debug!(target: "flowguard::admin", added = contracts.len(), "protected contracts added");
        Ok(())
    }

    /// Remove callers from the protected-contract allow-list. Idempotent.
    pub fn remove_protected_contracts(
        &self,
        caller: Address,
        contracts: &[Address],
    ) -> Result<(), FirewallError> {
        self.ensure_owner(caller)?;
        let mut set = self.protected_write();
        for contract in contracts {
            set.remove(contract);
        }
        debug!(target: "flowguard::admin", removed = contracts.len(), "protected contracts removed");
        Ok(())
    }

    /// Whether `address` may report flows. Pure lookup, no access control.
    pub fn is_protected_contract(&self, address: Address) -> bool {
        self.protected_read().contains(&address)
    }

    /// Hand the administrator role to `new_owner`.
    pub fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FirewallError> {
        self.ensure_owner(caller)?;
        *self.owner_write() = new_owner;
        debug!(target: "flowguard::admin", new_owner = %new_owner, "ownership transferred");
        Ok(())
    }

    /// The current administrator.
    pub fn owner(&self) -> Address {
        *self.owner_read()
    }

    /// The configured window geometry.
    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Rate-limited status of an asset; `None` when unregistered.
    pub fn limit_status(&self, asset: AssetId) -> Option<LimitStatus> {
        self.storage.with_entry(&asset, |limiter| limiter.status())
    }

    /// Snapshot of the full limiter record; `None` when unregistered.
    pub fn limiter(&self, asset: AssetId) -> Option<Limiter> {
        self.storage.with_entry(&asset, |limiter| limiter.clone())
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no assets are registered.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn apply_inflow(&self, asset: AssetId, amount: u128) -> Result<(), FirewallError> {
        let now = self.clock.now();
        self.storage
            .with_entry_mut(&asset, |limiter| limiter.record_inflow(now, amount))
            .ok_or(FirewallError::LimiterNotInitialized { asset })
    }

    pub(crate) fn apply_outflow(
        &self,
        asset: AssetId,
        amount: u128,
    ) -> Result<OutflowRecord, FirewallError> {
        let now = self.clock.now();
        self.storage
            .with_entry_mut(&asset, |limiter| {
                let status_before = limiter.status();
                let outcome = limiter.record_outflow(now, amount);
                OutflowRecord {
                    outcome,
                    recovery: limiter.params().recovery,
                    tripped: status_before == LimitStatus::Normal
                        && limiter.status() == LimitStatus::Triggered,
                }
            })
            .ok_or(FirewallError::LimiterNotInitialized { asset })
    }

    /// Reverse one outflow's delta after a failed settlement.
    ///
    /// The entry lock is released between the accounting commit and the
    /// settlement attempt, so other calls may have committed on the same
    /// asset in the meantime; their state must stay committed. Only the
    /// failed call's debit (and the trigger it caused, if any) is undone.
    pub(crate) fn unwind_outflow(&self, asset: AssetId, amount: u128, tripped: bool) {
        let _ = self
            .storage
            .with_entry_mut(&asset, |limiter| limiter.revert_outflow(amount, tripped));
    }
}

impl<S> std::fmt::Debug for LimiterRegistry<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimiterRegistry")
            .field("assets", &self.len())
            .field("protected", &self.protected_read().len())
            .field("geometry", &self.geometry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Arc;

    const OWNER: Address = Address::repeating(0x01);
    const STRANGER: Address = Address::repeating(0x02);
    const TOKEN: Address = Address::repeating(0x10);

    fn geometry() -> WindowGeometry {
        WindowGeometry {
            withdrawal_period: Duration::from_secs(4 * 3600),
            tick_length: Duration::from_secs(300),
        }
    }

    fn registry() -> LimiterRegistry<Arc<ShardedStorage<AssetId, Limiter>>> {
        LimiterRegistry::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(SystemClock::new()),
            OWNER,
            geometry(),
        )
    }

    fn params(bps: u16) -> LimiterParams {
        LimiterParams {
            min_retained_bps: bps,
            min_amount: 10,
            recovery: Address::repeating(0xaa),
        }
    }

    #[test]
    fn geometry_bucket_count() {
        assert_eq!(geometry().bucket_count(), 48);
    }

    #[test]
    fn register_validates_threshold_bounds() {
        let reg = registry();
        for bps in [0u16, 10_001] {
            assert_eq!(
                reg.register_asset(OWNER, TOKEN, params(bps)),
                Err(FirewallError::InvalidMinimumLiquidityThreshold { bps })
            );
        }
        assert!(reg.register_asset(OWNER, TOKEN, params(1)).is_ok());
    }

    #[test]
    fn duplicate_registration_fails() {
        let reg = registry();
        let id = reg.register_asset(OWNER, TOKEN, params(7_000)).unwrap();
        assert_eq!(
            reg.register_asset(OWNER, TOKEN, params(5_000)),
            Err(FirewallError::LimiterAlreadyInitialized { asset: id })
        );
    }

    #[test]
    fn update_validates_and_preserves_window() {
        let reg = registry();
        let id = reg.register_asset(OWNER, TOKEN, params(7_000)).unwrap();
        reg.apply_inflow(id, 10_000).unwrap();
        let window_before = reg.limiter(id).unwrap().window().clone();

        assert_eq!(
            reg.update_asset_params(OWNER, TOKEN, params(0)),
            Err(FirewallError::InvalidMinimumLiquidityThreshold { bps: 0 })
        );
        reg.update_asset_params(OWNER, TOKEN, params(2_500)).unwrap();

        let after = reg.limiter(id).unwrap();
        assert_eq!(after.params().min_retained_bps, 2_500);
        assert_eq!(after.window(), &window_before);
        assert_eq!(after.status(), LimitStatus::Normal);
    }

    #[test]
    fn update_requires_prior_registration() {
        let reg = registry();
        let id = AssetId::of(TOKEN);
        assert_eq!(
            reg.update_asset_params(OWNER, TOKEN, params(7_000)),
            Err(FirewallError::LimiterNotInitialized { asset: id })
        );
    }

    #[test]
    fn admin_surface_rejects_non_owner() {
        let reg = registry();
        let unauthorized = FirewallError::Unauthorized { caller: STRANGER };
        assert_eq!(
            reg.register_asset(STRANGER, TOKEN, params(7_000)),
            Err(unauthorized.clone())
        );
        assert_eq!(
            reg.update_asset_params(STRANGER, TOKEN, params(7_000)),
            Err(unauthorized.clone())
        );
        assert_eq!(
            reg.add_protected_contracts(STRANGER, &[STRANGER]),
            Err(unauthorized.clone())
        );
        assert_eq!(
            reg.remove_protected_contracts(STRANGER, &[STRANGER]),
            Err(unauthorized.clone())
        );
        assert_eq!(
            reg.transfer_ownership(STRANGER, STRANGER),
            Err(unauthorized)
        );
    }

    #[test]
    fn allow_list_round_trip() {
        let reg = registry();
        let contract = Address::repeating(0x33);
        assert!(!reg.is_protected_contract(contract));

        reg.add_protected_contracts(OWNER, &[contract]).unwrap();
        assert!(reg.is_protected_contract(contract));

        // Idempotent add.
        reg.add_protected_contracts(OWNER, &[contract]).unwrap();

        reg.remove_protected_contracts(OWNER, &[contract]).unwrap();
        assert!(!reg.is_protected_contract(contract));
    }

    #[test]
    fn ownership_transfer_hands_over_the_admin_surface() {
        let reg = registry();
        reg.transfer_ownership(OWNER, STRANGER).unwrap();
        assert_eq!(reg.owner(), STRANGER);

        assert!(reg.register_asset(STRANGER, TOKEN, params(7_000)).is_ok());
        assert_eq!(
            reg.transfer_ownership(OWNER, OWNER),
            Err(FirewallError::Unauthorized { caller: OWNER })
        );
    }
}
