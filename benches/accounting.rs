use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowguard::{
    Address, AssetId, FirewallAdapter, FirewallBuilder, LimiterParams, MockRecovery, MockVault,
};
use std::sync::Arc;

const ADMIN: Address = Address::repeating(0x01);
const PROTOCOL: Address = Address::repeating(0x02);
const RECIPIENT: Address = Address::repeating(0x20);
const RECOVERY: Address = Address::repeating(0xaa);

fn firewall_with_assets(count: usize) -> (FirewallAdapter<flowguard::DefaultStorage>, Vec<Address>) {
    let firewall = FirewallBuilder::new(ADMIN)
        .build(Arc::new(MockVault::new()), Arc::new(MockRecovery::new()))
        .unwrap();
    firewall
        .registry()
        .add_protected_contracts(ADMIN, &[PROTOCOL])
        .unwrap();

    let assets: Vec<Address> = (0..count)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[..8].copy_from_slice(&(i as u64).to_be_bytes());
            Address::new(bytes)
        })
        .collect();
    for &asset in &assets {
        firewall
            .registry()
            .register_asset(
                ADMIN,
                asset,
                LimiterParams {
                    min_retained_bps: 7_000,
                    min_amount: 10,
                    recovery: RECOVERY,
                },
            )
            .unwrap();
        // Deep reserves so the bench never trips the limiter.
        firewall
            .on_token_inflow(PROTOCOL, asset, u64::MAX as u128)
            .unwrap();
    }
    (firewall, assets)
}

/// Benchmark asset id derivation speed
fn bench_asset_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("asset_id");
    let address = Address::repeating(0x42);

    group.bench_function("derive", |b| b.iter(|| AssetId::of(black_box(address))));

    group.finish();
}

/// Benchmark single-threaded flow throughput
fn bench_single_threaded_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("inflows", |b| {
        let (firewall, assets) = firewall_with_assets(1);
        b.iter(|| {
            for _ in 0..1000 {
                black_box(firewall.on_token_inflow(PROTOCOL, assets[0], black_box(100))).unwrap();
            }
        })
    });

    group.bench_function("outflows", |b| {
        let (firewall, assets) = firewall_with_assets(1);
        b.iter(|| {
            for _ in 0..1000 {
                black_box(
                    firewall.on_token_outflow(PROTOCOL, assets[0], black_box(100), RECIPIENT),
                )
                .unwrap();
            }
        })
    });

    group.finish();
}

/// Benchmark multi-threaded concurrent throughput
fn bench_concurrent_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let (firewall, assets) = firewall_with_assets(num_threads);
                    let firewall = Arc::new(firewall);

                    let mut handles = vec![];
                    for i in 0..num_threads {
                        let firewall = Arc::clone(&firewall);
                        // Each thread works a different asset to avoid contention
                        let asset = assets[i];
                        let handle = std::thread::spawn(move || {
                            for _ in 0..1000 {
                                black_box(
                                    firewall.on_token_outflow(PROTOCOL, asset, 100, RECIPIENT),
                                )
                                .unwrap();
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_asset_id,
    bench_single_threaded_throughput,
    bench_concurrent_throughput
);
criterion_main!(benches);
