//! Asset adapter: asset-class-specific reporting entry points and fund
//! movement, plus the builder assembling a complete firewall.
//!
//! The adapter translates token and native-currency reporting calls into the
//! canonical accounting call (the native currency travels under the reserved
//! placeholder address) and fulfills the settlement hooks: paying the
//! recipient on a normal outcome, or routing the disputed amount to the
//! recovery collaborator on a trigger.

use crate::application::error::FirewallError;
use crate::application::gateway::ProtectionGateway;
use crate::application::ports::{
    Clock, RecoveryPort, SettlementHook, Storage, TransferError, TransferIntent, TransferPort,
};
use crate::application::registry::{LimiterRegistry, WindowGeometry};
use crate::domain::asset::{Address, AssetId};
use crate::domain::limiter::{FlowOutcome, Limiter};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Fund movement for fungible token assets.
pub struct TokenSettlement {
    vault: Arc<dyn TransferPort>,
    recovery: Arc<dyn RecoveryPort>,
}

impl SettlementHook for TokenSettlement {
    fn deliver(&self, asset: Address, intent: &TransferIntent) -> Result<(), TransferError> {
        self.vault
            .transfer_token(asset, intent.recipient, intent.amount)
    }

    fn on_firewall_trigger(
        &self,
        asset: Address,
        recovery: Address,
        intent: &TransferIntent,
    ) -> Result<(), TransferError> {
        self.vault.transfer_token(asset, recovery, intent.amount)?;
        self.recovery.hold_transfer(asset, intent)
    }
}

/// Fund movement for the native currency.
pub struct NativeSettlement {
    vault: Arc<dyn TransferPort>,
    recovery: Arc<dyn RecoveryPort>,
}

impl SettlementHook for NativeSettlement {
    fn deliver(&self, _asset: Address, intent: &TransferIntent) -> Result<(), TransferError> {
        self.vault.transfer_native(intent.recipient, intent.amount)
    }

    fn on_firewall_trigger(
        &self,
        _asset: Address,
        recovery: Address,
        intent: &TransferIntent,
    ) -> Result<(), TransferError> {
        self.vault.transfer_native(recovery, intent.amount)?;
        self.recovery.hold_transfer(Address::NATIVE, intent)
    }
}

/// Default storage used by the builder.
pub type DefaultStorage = Arc<ShardedStorage<AssetId, Limiter>>;

/// The flow-reporting surface consumed by protected contracts.
///
/// Inflow reports move no funds (they are assumed already in custody);
/// outflow reports complete the transfer to the recipient, or divert it to
/// recovery when the drawdown trigger fires.
pub struct FirewallAdapter<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    gateway: Arc<ProtectionGateway<S>>,
    token: TokenSettlement,
    native: NativeSettlement,
}

impl<S> FirewallAdapter<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    /// Wire an adapter over a gateway and the external collaborators.
    pub fn new(
        gateway: Arc<ProtectionGateway<S>>,
        vault: Arc<dyn TransferPort>,
        recovery: Arc<dyn RecoveryPort>,
    ) -> Self {
        Self {
            gateway,
            token: TokenSettlement {
                vault: Arc::clone(&vault),
                recovery: Arc::clone(&recovery),
            },
            native: NativeSettlement { vault, recovery },
        }
    }

    /// Report a token inflow into custody.
    pub fn on_token_inflow(
        &self,
        caller: Address,
        token: Address,
        amount: u128,
    ) -> Result<(), FirewallError> {
        self.gateway.report_inflow(caller, token, amount)
    }

    /// Report a token outflow and settle it.
    pub fn on_token_outflow(
        &self,
        caller: Address,
        token: Address,
        amount: u128,
        recipient: Address,
    ) -> Result<FlowOutcome, FirewallError> {
        self.gateway.report_outflow(
            caller,
            token,
            TransferIntent { recipient, amount },
            &self.token,
        )
    }

    /// Report a native-currency inflow into custody.
    pub fn on_native_asset_inflow(
        &self,
        caller: Address,
        amount: u128,
    ) -> Result<(), FirewallError> {
        self.gateway.report_inflow(caller, Address::NATIVE, amount)
    }

    /// Report a native-currency outflow and settle it.
    pub fn on_native_asset_outflow(
        &self,
        caller: Address,
        amount: u128,
        recipient: Address,
    ) -> Result<FlowOutcome, FirewallError> {
        self.gateway.report_outflow(
            caller,
            Address::NATIVE,
            TransferIntent { recipient, amount },
            &self.native,
        )
    }

    /// The gateway behind this adapter.
    pub fn gateway(&self) -> &Arc<ProtectionGateway<S>> {
        &self.gateway
    }

    /// The registry behind this adapter.
    pub fn registry(&self) -> &Arc<LimiterRegistry<S>> {
        self.gateway.registry()
    }
}

impl<S> fmt::Debug for FirewallAdapter<S>
where
    S: Storage<AssetId, Limiter> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirewallAdapter")
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Errors from assembling a firewall with invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `tick_length` must be non-zero.
    ZeroTickLength,
    /// `withdrawal_period` must be non-zero.
    ZeroWithdrawalPeriod,
    /// `withdrawal_period` must be at least one tick long.
    PeriodShorterThanTick,
    /// `withdrawal_period` must be a whole number of ticks.
    PeriodNotTickAligned,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ZeroTickLength => write!(f, "tick_length must be non-zero"),
            BuildError::ZeroWithdrawalPeriod => write!(f, "withdrawal_period must be non-zero"),
            BuildError::PeriodShorterThanTick => {
                write!(f, "withdrawal_period must be at least one tick long")
            }
            BuildError::PeriodNotTickAligned => {
                write!(f, "withdrawal_period must be a whole number of ticks")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder assembling a registry, gateway, and adapter with validated
/// window geometry.
///
/// # Example
///
/// ```rust,no_run
/// use flowguard::{Address, FirewallBuilder};
/// use std::sync::Arc;
/// use std::time::Duration;
/// # use flowguard::{RecoveryPort, TransferPort, TransferError, TransferIntent};
/// # struct Vault;
/// # impl TransferPort for Vault {
/// #     fn transfer_token(&self, _: Address, _: Address, _: u128) -> Result<(), TransferError> { Ok(()) }
/// #     fn transfer_native(&self, _: Address, _: u128) -> Result<(), TransferError> { Ok(()) }
/// # }
/// # struct Recovery;
/// # impl RecoveryPort for Recovery {
/// #     fn hold_transfer(&self, _: Address, _: &TransferIntent) -> Result<(), TransferError> { Ok(()) }
/// # }
///
/// let firewall = FirewallBuilder::new(Address::repeating(0x01))
///     .with_withdrawal_period(Duration::from_secs(4 * 3600))
///     .with_tick_length(Duration::from_secs(300))
///     .build(Arc::new(Vault), Arc::new(Recovery))
///     .unwrap();
/// ```
pub struct FirewallBuilder {
    owner: Address,
    withdrawal_period: Duration,
    tick_length: Duration,
    clock: Arc<dyn Clock>,
}

impl FirewallBuilder {
    /// Start a builder with the default geometry: a 4-hour window in
    /// 5-minute ticks.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            withdrawal_period: Duration::from_secs(4 * 3600),
            tick_length: Duration::from_secs(300),
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Total duration of the sliding window.
    pub fn with_withdrawal_period(mut self, period: Duration) -> Self {
        self.withdrawal_period = period;
        self
    }

    /// Bucket granularity of the window.
    pub fn with_tick_length(mut self, tick: Duration) -> Self {
        self.tick_length = tick;
        self
    }

    /// Substitute the clock, e.g. a `MockClock` in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn validated_geometry(&self) -> Result<WindowGeometry, BuildError> {
        if self.tick_length.is_zero() {
            return Err(BuildError::ZeroTickLength);
        }
        if self.withdrawal_period.is_zero() {
            return Err(BuildError::ZeroWithdrawalPeriod);
        }
        if self.withdrawal_period < self.tick_length {
            return Err(BuildError::PeriodShorterThanTick);
        }
        if self.withdrawal_period.as_nanos() % self.tick_length.as_nanos() != 0 {
            return Err(BuildError::PeriodNotTickAligned);
        }
        Ok(WindowGeometry {
            withdrawal_period: self.withdrawal_period,
            tick_length: self.tick_length,
        })
    }

    /// Assemble the full stack over the external collaborators.
    pub fn build(
        self,
        vault: Arc<dyn TransferPort>,
        recovery: Arc<dyn RecoveryPort>,
    ) -> Result<FirewallAdapter<DefaultStorage>, BuildError> {
        let geometry = self.validated_geometry()?;
        let registry = Arc::new(LimiterRegistry::new(
            Arc::new(ShardedStorage::new()),
            self.clock,
            self.owner,
            geometry,
        ));
        let gateway = Arc::new(ProtectionGateway::new(registry));
        Ok(FirewallAdapter::new(gateway, vault, recovery))
    }
}
