//! Sliding-window liquidity accounting.
//!
//! A [`FlowWindow`] tracks net asset flow in a fixed ring of time buckets
//! spanning the configured withdrawal period, plus a rolling liquidity
//! baseline. Rotation is lazy: each call folds elapsed ticks forward before
//! mutating, so no timer task is needed.
//!
//! The quantity the drawdown rule protects is the *reference level*: the
//! baseline as it stood before the trailing window's withdrawals. Inflows
//! raise both the baseline and the reference immediately; withdrawals lower
//! the baseline immediately but only leave the reference once their bucket
//! ages out of the window.

use std::time::{Duration, Instant};

/// Signed net flow plus the withdrawal portion for one tick interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Net flow (inflows minus outflows) recorded during the tick.
    pub net: i128,
    /// Sum of outflow amounts recorded during the tick.
    pub withdrawn: u128,
}

/// Fixed-size ring of tick buckets with a rolling liquidity baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowWindow {
    buckets: Vec<Bucket>,
    /// Index of the bucket covering the current tick.
    head: usize,
    baseline: i128,
    /// Running sum of `withdrawn` across all live buckets.
    withdrawn_in_window: u128,
    tick_length: Duration,
    last_rotation: Instant,
}

/// Clamp an unsigned amount into signed accounting space.
fn signed(amount: u128) -> i128 {
    i128::try_from(amount).unwrap_or(i128::MAX)
}

impl FlowWindow {
    /// Create an empty window of `bucket_count` ticks of `tick_length` each.
    ///
    /// `bucket_count` must be at least 1 and `tick_length` non-zero; both are
    /// validated by the gateway builder before any window is created.
    pub fn new(bucket_count: usize, tick_length: Duration, now: Instant) -> Self {
        Self {
            buckets: vec![Bucket::default(); bucket_count.max(1)],
            head: 0,
            baseline: 0,
            withdrawn_in_window: 0,
            tick_length,
            last_rotation: now,
        }
    }

    /// Fold elapsed ticks forward so the head bucket covers `now`.
    ///
    /// Elapsed ticks are capped at the ring length: once the whole window has
    /// gone stale the ring is cleared outright rather than replayed.
    pub fn rotate(&mut self, now: Instant) {
        let tick_nanos = self.tick_length.as_nanos().max(1);
        let elapsed = now.saturating_duration_since(self.last_rotation).as_nanos();
        let ticks = elapsed / tick_nanos;
        if ticks == 0 {
            return;
        }

        if ticks as usize >= self.buckets.len() || ticks > usize::MAX as u128 {
            for bucket in &mut self.buckets {
                *bucket = Bucket::default();
            }
            self.withdrawn_in_window = 0;
            // Re-align to the tick grid ending at `now`.
            let remainder = (elapsed % tick_nanos) as u64;
            self.last_rotation = now - Duration::from_nanos(remainder);
            return;
        }

        for _ in 0..ticks {
            self.head = (self.head + 1) % self.buckets.len();
            let expired = std::mem::take(&mut self.buckets[self.head]);
            self.withdrawn_in_window = self
                .withdrawn_in_window
                .saturating_sub(expired.withdrawn);
        }
        let advance = (tick_nanos * ticks).min(u64::MAX as u128) as u64;
        self.last_rotation += Duration::from_nanos(advance);
    }

    /// Credit an inflow to the current bucket and the baseline.
    ///
    /// The caller rotates first; deposits never evaluate a trigger.
    pub fn credit(&mut self, amount: u128) {
        self.baseline = self.baseline.saturating_add(signed(amount));
        self.buckets[self.head].net = self.buckets[self.head].net.saturating_add(signed(amount));
    }

    /// Debit an outflow from the current bucket and the baseline.
    ///
    /// Applied unconditionally: the obligation exists even when payment is
    /// deferred to the recovery collaborator.
    pub fn debit(&mut self, amount: u128) {
        self.baseline = self.baseline.saturating_sub(signed(amount));
        let bucket = &mut self.buckets[self.head];
        bucket.net = bucket.net.saturating_sub(signed(amount));
        bucket.withdrawn = bucket.withdrawn.saturating_add(amount);
        self.withdrawn_in_window = self.withdrawn_in_window.saturating_add(amount);
    }

    /// Reverse a debit recorded earlier in the same call.
    ///
    /// Touches only this debit's contribution, so flows committed by other
    /// calls in between survive.
    pub fn undo_debit(&mut self, amount: u128) {
        self.baseline = self.baseline.saturating_add(signed(amount));
        let bucket = &mut self.buckets[self.head];
        bucket.net = bucket.net.saturating_add(signed(amount));
        bucket.withdrawn = bucket.withdrawn.saturating_sub(amount);
        self.withdrawn_in_window = self.withdrawn_in_window.saturating_sub(amount);
    }

    /// Current rolling liquidity baseline.
    pub fn baseline(&self) -> i128 {
        self.baseline
    }

    /// Liquidity level before the trailing window's withdrawals.
    pub fn reference(&self) -> i128 {
        self.baseline
            .saturating_add(signed(self.withdrawn_in_window))
    }

    /// Sum of withdrawal amounts still inside the window.
    pub fn withdrawn_in_window(&self) -> u128 {
        self.withdrawn_in_window
    }

    /// Net flow summed over all live buckets.
    pub fn net_in_window(&self) -> i128 {
        self.buckets
            .iter()
            .fold(0i128, |acc, b| acc.saturating_add(b.net))
    }

    /// Number of tick buckets in the ring.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Timestamp of the last bucket rotation (tick-aligned).
    pub fn last_rotation(&self) -> Instant {
        self.last_rotation
    }
}
