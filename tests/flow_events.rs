//! Integration tests for the structured events emitted on the
//! `flowguard::flow` and `flowguard::admin` targets.

use flowguard::{
    Address, AssetId, FirewallAdapter, FirewallBuilder, LimiterParams, MockRecovery, MockVault,
};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

const ADMIN: Address = Address::repeating(0x01);
const PROTOCOL: Address = Address::repeating(0x02);
const TOKEN: Address = Address::repeating(0x10);
const ALICE: Address = Address::repeating(0x20);
const RECOVERY: Address = Address::repeating(0xaa);

/// One event as seen by [`CaptureLayer`].
#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    level: Level,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Layer that captures events for assertion.
#[derive(Clone, Default)]
struct CaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    fn new() -> Self {
        Self::default()
    }

    fn events_on(&self, target: &str) -> Vec<CapturedEvent> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.target == target)
            .cloned()
            .collect()
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor { fields: Vec::new() };
        event.record(&mut visitor);
        self.captured.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            fields: visitor.fields,
        });
    }
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{value:?}")));
    }
}

fn firewall() -> FirewallAdapter<flowguard::DefaultStorage> {
    let firewall = FirewallBuilder::new(ADMIN)
        .build(Arc::new(MockVault::new()), Arc::new(MockRecovery::new()))
        .unwrap();
    firewall
        .registry()
        .add_protected_contracts(ADMIN, &[PROTOCOL])
        .unwrap();
    firewall
        .registry()
        .register_asset(
            ADMIN,
            TOKEN,
            LimiterParams {
                min_retained_bps: 7_000,
                min_amount: 10,
                recovery: RECOVERY,
            },
        )
        .unwrap();
    firewall
}

#[test]
fn accepted_inflow_emits_a_flow_event() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let fw = firewall();
        fw.on_token_inflow(PROTOCOL, TOKEN, 10_000).unwrap();
    });

    let events = capture.events_on("flowguard::flow");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, Level::INFO);
    assert_eq!(event.field("direction"), Some("in"));
    assert_eq!(event.field("amount"), Some("10000"));
    assert_eq!(event.field("caller"), Some(PROTOCOL.to_string().as_str()));
    assert_eq!(
        event.field("asset"),
        Some(AssetId::of(TOKEN).to_string().as_str())
    );
}

#[test]
fn delivered_outflow_emits_its_outcome() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let fw = firewall();
        fw.on_token_inflow(PROTOCOL, TOKEN, 10_000).unwrap();
        fw.on_token_outflow(PROTOCOL, TOKEN, 2_900, ALICE).unwrap();
    });

    let events = capture.events_on("flowguard::flow");
    assert_eq!(events.len(), 2);
    let outflow = &events[1];
    assert_eq!(outflow.level, Level::INFO);
    assert_eq!(outflow.field("direction"), Some("out"));
    assert_eq!(outflow.field("outcome"), Some("Delivered"));
    assert_eq!(outflow.field("amount"), Some("2900"));
}

#[test]
fn trigger_emits_a_warning_with_the_diversion_route() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let fw = firewall();
        fw.on_token_inflow(PROTOCOL, TOKEN, 10_000).unwrap();
        fw.on_token_outflow(PROTOCOL, TOKEN, 2_900, ALICE).unwrap();
        fw.on_token_outflow(PROTOCOL, TOKEN, 200, ALICE).unwrap();
    });

    let events = capture.events_on("flowguard::flow");
    let warnings: Vec<_> = events
        .iter()
        .filter(|event| event.level == Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    let warning = warnings[0];
    assert_eq!(warning.field("amount"), Some("200"));
    assert_eq!(warning.field("recipient"), Some(ALICE.to_string().as_str()));
    assert_eq!(warning.field("recovery"), Some(RECOVERY.to_string().as_str()));

    // The diverted settlement still records as an accepted flow.
    let diverted = events.last().unwrap();
    assert_eq!(diverted.level, Level::INFO);
    assert_eq!(diverted.field("outcome"), Some("Diverted"));
}

#[test]
fn rejected_reports_emit_no_flow_event() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let fw = firewall();
        let outsider = Address::repeating(0x99);
        assert!(fw.on_token_inflow(outsider, TOKEN, 10_000).is_err());
    });

    assert!(capture.events_on("flowguard::flow").is_empty());
}

#[test]
fn admin_mutations_emit_on_their_own_target() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        firewall();
    });

    let events = capture.events_on("flowguard::admin");
    let registered = events
        .iter()
        .find(|event| event.field("min_retained_bps").is_some())
        .expect("registration event");
    assert_eq!(registered.level, Level::DEBUG);
    assert_eq!(registered.field("min_retained_bps"), Some("7000"));
    assert!(capture.events_on("flowguard::flow").is_empty());
}
