//! Protection gateway: admission control and flow orchestration.
//!
//! Every flow report passes two composable guards (protected caller, global
//! operational flag) before touching the accountant. Accounting commits
//! under the per-asset entry lock; settlement runs after the commit, so a
//! reentrant report observes consistent, already-updated state. A settlement
//! failure unwinds exactly the failed call's delta, making each call
//! all-or-nothing without disturbing calls that committed in between.

use crate::application::error::FirewallError;
use crate::application::metrics::Metrics;
use crate::application::ports::{SettlementHook, Storage, TransferIntent};
use crate::application::registry::LimiterRegistry;
use crate::domain::asset::{Address, AssetId};
use crate::domain::limiter::{FlowOutcome, Limiter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Admission control plus orchestration between the accountant and the
/// settlement hooks.
pub struct ProtectionGateway<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    registry: Arc<LimiterRegistry<S>>,
    operational: AtomicBool,
    metrics: Metrics,
}

impl<S> ProtectionGateway<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    /// Create a gateway over a registry. Starts operational.
    pub fn new(registry: Arc<LimiterRegistry<S>>) -> Self {
        Self {
            registry,
            operational: AtomicBool::new(true),
            metrics: Metrics::new(),
        }
    }

    /// Guard: caller must be on the protected-contract allow-list.
    fn ensure_protected(&self, caller: Address) -> Result<(), FirewallError> {
        if self.registry.is_protected_contract(caller) {
            Ok(())
        } else {
            Err(FirewallError::Unauthorized { caller })
        }
    }

    /// Guard: the global operational flag must be set.
    fn ensure_operational(&self) -> Result<(), FirewallError> {
        if self.operational.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(FirewallError::NotOperational)
        }
    }

    fn admit(&self, caller: Address) -> Result<(), FirewallError> {
        self.ensure_protected(caller).and_then(|()| self.ensure_operational())
            .inspect_err(|_| self.metrics.record_rejected())
    }

    /// Report an inflow of `amount` into custody.
    ///
    /// No fund movement: funds are assumed already in custody before the
    /// report. Deposits never evaluate a trigger.
    pub fn report_inflow(
        &self,
        caller: Address,
        asset: Address,
        amount: u128,
    ) -> Result<(), FirewallError> {
        self.admit(caller)?;
        let id = AssetId::of(asset);
        self.registry.apply_inflow(id, amount).inspect_err(|_| {
            self.metrics.record_rejected();
        })?;
        self.metrics.record_inflow();
        info!(
            target: "flowguard::flow",
            asset = %id,
            caller = %caller,
            amount,
            direction = "in",
            "flow recorded"
        );
        Ok(())
    }

    /// Report an outflow and settle it through `hook`.
    ///
    /// On a normal outcome the hook delivers to the intended recipient; on a
    /// trigger it routes the amount to the limiter's recovery target and
    /// registers the hold. Either way the accounting debit stands. A
    /// settlement failure reverses this call's debit (and the trigger it
    /// caused, if any) and fails the whole call with `NativeTransferFailed`.
    pub fn report_outflow(
        &self,
        caller: Address,
        asset: Address,
        intent: TransferIntent,
        hook: &dyn SettlementHook,
    ) -> Result<FlowOutcome, FirewallError> {
        self.admit(caller)?;
        let id = AssetId::of(asset);
        let record = self.registry.apply_outflow(id, intent.amount).inspect_err(|_| {
            self.metrics.record_rejected();
        })?;

        let settled = match record.outcome {
            FlowOutcome::Delivered => hook.deliver(asset, &intent),
            FlowOutcome::Diverted => {
                warn!(
                    target: "flowguard::flow",
                    asset = %id,
                    caller = %caller,
                    amount = intent.amount,
                    recipient = %intent.recipient,
                    recovery = %record.recovery,
                    "drawdown trigger fired; diverting to recovery"
                );
                hook.on_firewall_trigger(asset, record.recovery, &intent)
            }
        };

        if let Err(err) = settled {
            self.registry
                .unwind_outflow(id, intent.amount, record.tripped);
            self.metrics.record_rejected();
            debug!(
                target: "flowguard::flow",
                asset = %id,
                error = %err,
                "settlement failed; accounting rolled back"
            );
            return Err(FirewallError::NativeTransferFailed);
        }

        self.metrics.record_outflow();
        if record.outcome == FlowOutcome::Diverted {
            self.metrics.record_diverted();
        }
        info!(
            target: "flowguard::flow",
            asset = %id,
            caller = %caller,
            amount = intent.amount,
            direction = "out",
            outcome = ?record.outcome,
            "flow recorded"
        );
        Ok(record.outcome)
    }

    /// Pause or resume the flow-reporting surface. Administrator-only.
    pub fn set_operational(&self, caller: Address, operational: bool) -> Result<(), FirewallError> {
        if self.registry.owner() != caller {
            return Err(FirewallError::Unauthorized { caller });
        }
        self.operational.store(operational, Ordering::Release);
        debug!(target: "flowguard::admin", operational, "operational flag set");
        Ok(())
    }

    /// Whether flow reports are currently admitted.
    pub fn is_operational(&self) -> bool {
        self.operational.load(Ordering::Acquire)
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<LimiterRegistry<S>> {
        &self.registry
    }

    /// Flow metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<S> std::fmt::Debug for ProtectionGateway<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectionGateway")
            .field("operational", &self.is_operational())
            .field("registry", &self.registry)
            .finish()
    }
}
