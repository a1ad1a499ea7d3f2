//! # flowguard
//!
//! A sliding-window liquidity firewall for custody layers.
//!
//! flowguard sits between a custody layer holding assets (tokens and a
//! native currency) and the operations that move those assets. Upstream
//! protocols on an allow-list report every inflow and outflow of monitored
//! assets; flowguard tracks a rolling liquidity baseline per asset over a
//! configurable time window and trips a per-asset circuit breaker when a
//! withdrawal would draw liquidity below a configured retention floor.
//! Tripped outflows are not delivered: they are diverted to a recovery
//! collaborator for later arbitration, and the call still succeeds.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowguard::{Address, FirewallBuilder, LimiterParams};
//! use std::sync::Arc;
//! use std::time::Duration;
//! # use flowguard::{RecoveryPort, TransferPort, TransferError, TransferIntent};
//! # struct Vault;
//! # impl TransferPort for Vault {
//! #     fn transfer_token(&self, _: Address, _: Address, _: u128) -> Result<(), TransferError> { Ok(()) }
//! #     fn transfer_native(&self, _: Address, _: u128) -> Result<(), TransferError> { Ok(()) }
//! # }
//! # struct Recovery;
//! # impl RecoveryPort for Recovery {
//! #     fn hold_transfer(&self, _: Address, _: &TransferIntent) -> Result<(), TransferError> { Ok(()) }
//! # }
//!
//! let admin = Address::repeating(0x01);
//! let protocol = Address::repeating(0x02);
//! let token = Address::repeating(0x10);
//!
//! // A 4-hour window in 5-minute ticks (48 buckets).
//! let firewall = FirewallBuilder::new(admin)
//!     .with_withdrawal_period(Duration::from_secs(4 * 3600))
//!     .with_tick_length(Duration::from_secs(300))
//!     .build(Arc::new(Vault), Arc::new(Recovery))
//!     .unwrap();
//!
//! // Admin surface: register the asset and allow-list the reporter.
//! firewall.registry().register_asset(admin, token, LimiterParams {
//!     min_retained_bps: 7_000,   // at least 70% of the reference must remain
//!     min_amount: 1_000,         // dust exemption floor
//!     recovery: Address::repeating(0xaa),
//! }).unwrap();
//! firewall.registry().add_protected_contracts(admin, &[protocol]).unwrap();
//!
//! // Flow surface: the protocol reports custody movements.
//! firewall.on_token_inflow(protocol, token, 1_000_000).unwrap();
//! let outcome = firewall
//!     .on_token_outflow(protocol, token, 250_000, Address::repeating(0x20))
//!     .unwrap();
//! println!("outflow settled as {outcome:?}");
//! ```
//!
//! ## How the trigger works
//!
//! Each registered asset owns a fixed ring of time buckets spanning the
//! withdrawal period, rotated lazily from wall-clock time, plus a rolling
//! liquidity baseline. Inflows raise the baseline; outflows lower it. The
//! drawdown rule protects the *reference level*, the baseline before the
//! trailing window's withdrawals:
//!
//! ```text
//! floor     = reference * min_retained_bps / 10000
//! projected = baseline - amount
//! trigger  iff  projected < floor        (equality is not a breach)
//! ```
//!
//! Withdrawals below `min_amount` are exempt (dust never trips the
//! breaker), and an asset with no observed liquidity never triggers. Once
//! triggered, every subsequent outflow diverts until an administrator
//! intervenes.
//!
//! ## Atomicity
//!
//! Every call is all-or-nothing. Admission guards and validation run before
//! any mutation; per-asset accounting commits under the storage entry lock;
//! settlement runs last, and a settlement failure reverses exactly that
//! call's debit and surfaces `NativeTransferFailed`. A diverted outflow is
//! *not* an error: the call succeeds with [`FlowOutcome::Diverted`].
//!
//! ## Native currency
//!
//! The native currency is reported through its own entry points
//! (`on_native_asset_inflow` / `on_native_asset_outflow`) but flows through
//! the same accounting path as tokens: it is keyed by the reserved
//! placeholder address [`Address::NATIVE`].
//!
//! ## Observability
//!
//! Every accepted flow report emits a `tracing` event under the
//! `flowguard::flow` target carrying the asset identifier, reporting
//! caller, amount, and outcome; triggers emit a `warn!`. Counters are
//! available via [`Metrics`].
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` on public record types.
//! - `test-helpers`: exposes `MockClock`, `MockVault`, and `MockRecovery`
//!   to downstream test suites.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    asset::{Address, AssetId},
    limiter::{FlowOutcome, LimitStatus, Limiter, LimiterParams, BPS_DENOMINATOR},
    window::{Bucket, FlowWindow},
};

pub use application::{
    error::FirewallError,
    gateway::ProtectionGateway,
    metrics::{Metrics, MetricsSnapshot},
    ports::{
        Clock, RecoveryPort, SettlementHook, Storage, TransferError, TransferIntent, TransferPort,
    },
    registry::{LimiterRegistry, WindowGeometry},
};

pub use infrastructure::{
    adapter::{
        BuildError, DefaultStorage, FirewallAdapter, FirewallBuilder, NativeSettlement,
        TokenSettlement,
    },
    clock::SystemClock,
    storage::ShardedStorage,
};

#[cfg(any(test, feature = "test-helpers"))]
pub use infrastructure::mocks::{
    HeldTransfer, MockClock, MockRecovery, MockVault, RecordedTransfer,
};
