//! Per-asset limiter records and the drawdown trigger rule.

use crate::domain::asset::Address;
use crate::domain::window::FlowWindow;
use std::time::{Duration, Instant};

/// Denominator for basis-point arithmetic (10000 bps = 100%).
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Whether an asset's circuit breaker has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LimitStatus {
    /// Withdrawals are delivered normally.
    Normal,
    /// The drawdown rule breached; outflows divert to recovery.
    Triggered,
}

/// How a reported outflow was settled.
///
/// A diversion is not an error: the call succeeds, the funds just take a
/// different route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowOutcome {
    /// The recipient was paid.
    Delivered,
    /// The amount was routed to the recovery collaborator instead.
    Diverted,
}

/// Administrator-set parameters of a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterParams {
    /// Fraction of the reference liquidity that must be retained, in basis
    /// points. Valid range 1..=10000.
    pub min_retained_bps: u16,
    /// Withdrawals below this amount are exempt from the drawdown check.
    pub min_amount: u128,
    /// Recovery collaborator receiving diverted funds.
    pub recovery: Address,
}

impl LimiterParams {
    /// Whether the retention threshold is inside the valid range.
    pub fn threshold_is_valid(&self) -> bool {
        self.min_retained_bps >= 1 && self.min_retained_bps <= BPS_DENOMINATOR
    }
}

/// The full per-asset record: parameters, window state, and status.
///
/// Created by registration, mutated by every flow report and by
/// administrative parameter updates (which never touch the window, baseline,
/// or status), never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limiter {
    params: LimiterParams,
    window: FlowWindow,
    status: LimitStatus,
}

impl Limiter {
    /// Fresh limiter with a zeroed window and `Normal` status.
    pub fn new(
        params: LimiterParams,
        bucket_count: usize,
        tick_length: Duration,
        now: Instant,
    ) -> Self {
        Self {
            params,
            window: FlowWindow::new(bucket_count, tick_length, now),
            status: LimitStatus::Normal,
        }
    }

    /// Record a reported inflow. Deposits never evaluate the trigger.
    pub fn record_inflow(&mut self, now: Instant, amount: u128) {
        self.window.rotate(now);
        if amount == 0 {
            return;
        }
        self.window.credit(amount);
    }

    /// Record a reported outflow and decide how it settles.
    ///
    /// The amount is debited from the accounting state regardless of the
    /// outcome. The drawdown check is skipped for dust
    /// (`amount < min_amount`) and whenever nothing has been observed to
    /// protect (reference level at or below zero). Equality with the floor is
    /// not a breach. Once triggered, every subsequent outflow diverts until
    /// an administrator intervenes.
    pub fn record_outflow(&mut self, now: Instant, amount: u128) -> FlowOutcome {
        self.window.rotate(now);
        if amount == 0 {
            return match self.status {
                LimitStatus::Normal => FlowOutcome::Delivered,
                LimitStatus::Triggered => FlowOutcome::Diverted,
            };
        }

        let breached = match self.status {
            LimitStatus::Triggered => true,
            LimitStatus::Normal => {
                amount >= self.params.min_amount && self.drawdown_breaches(amount)
            }
        };

        self.window.debit(amount);

        if breached {
            self.status = LimitStatus::Triggered;
            FlowOutcome::Diverted
        } else {
            FlowOutcome::Delivered
        }
    }

    /// Evaluate the retention rule against the pre-debit window state.
    fn drawdown_breaches(&self, amount: u128) -> bool {
        let reference = self.window.reference();
        if reference <= 0 {
            // No liquidity has been observed yet; there is nothing to protect.
            return false;
        }
        let floor = reference.saturating_mul(i128::from(self.params.min_retained_bps))
            / i128::from(BPS_DENOMINATOR);
        let projected = self
            .window
            .baseline()
            .saturating_sub(i128::try_from(amount).unwrap_or(i128::MAX));
        projected < floor
    }

    /// Reverse an outflow recorded earlier in the same call, after its
    /// settlement failed.
    ///
    /// Credits back exactly this outflow's debit and, when this outflow is
    /// the one that tripped the breaker, clears the trigger. State committed
    /// by calls that interleaved between the outflow and its reversal is
    /// left intact.
    pub fn revert_outflow(&mut self, amount: u128, tripped: bool) {
        if amount != 0 {
            self.window.undo_debit(amount);
        }
        if tripped {
            self.status = LimitStatus::Normal;
        }
    }

    /// Replace the administrator-set parameters, leaving window and status
    /// untouched.
    pub fn set_params(&mut self, params: LimiterParams) {
        self.params = params;
    }

    /// Current parameters.
    pub fn params(&self) -> &LimiterParams {
        &self.params
    }

    /// Current status.
    pub fn status(&self) -> LimitStatus {
        self.status
    }

    /// Window state, read-only.
    pub fn window(&self) -> &FlowWindow {
        &self.window
    }
}
