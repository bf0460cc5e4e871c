// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use decluster_bench::SyntheticCatalog;
use decluster_core::haversine_many_km;
use decluster_windows::{WindowMethod, compute_windows};

const N: usize = 100_000;

fn benchmark_window_models(c: &mut Criterion) {
    let catalog = SyntheticCatalog::generate(N, 11);
    let mut group = c.benchmark_group("window_models");

    for method in WindowMethod::ALL {
        group.bench_function(format!("{}_n1e5", method.as_str()), |b| {
            b.iter(|| {
                let _windows = compute_windows(
                    black_box(&method),
                    black_box(&catalog.magnitude),
                    black_box(Some(365.0)),
                )
                .expect("window computation should succeed");
            })
        });
    }

    group.bench_function("haversine_many_n1e5", |b| {
        b.iter(|| {
            let _distances = haversine_many_km(
                black_box(&catalog.longitude),
                black_box(&catalog.latitude),
                black_box(2.5),
                black_box(42.5),
            )
            .expect("distance computation should succeed");
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_window_models);
criterion_main!(benches);
