use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sessionnet::{RequestInput, SessionRegistry};

fn input(session: &str) -> RequestInput {
    RequestInput::new("GET", "https://example.com")
        .with_session_id(session)
        .with_identifier("chrome_124")
}

fn bench_resolve_existing(c: &mut Criterion) {
    let registry = SessionRegistry::new();
    let existing = input("bench");
    registry.resolve(&existing).unwrap();

    c.bench_function("registry_resolve_existing", |b| {
        b.iter(|| black_box(registry.resolve(black_box(&existing)).unwrap()))
    });

    let toggled = existing.clone().with_follow_redirects(true);
    c.bench_function("registry_resolve_modify_redirects", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let req = if flip { &toggled } else { &existing };
            black_box(registry.resolve(req).unwrap())
        })
    });
}

fn bench_create_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_create");
    for profile in ["chrome_124", "firefox_128", "safari_16_0"] {
        group.bench_with_input(BenchmarkId::from_parameter(profile), profile, |b, p| {
            let registry = SessionRegistry::new();
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                let req = RequestInput::new("GET", "https://example.com")
                    .with_session_id(format!("s{}", n))
                    .with_identifier(p);
                black_box(registry.resolve(&req).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_resolve_populated(c: &mut Criterion) {
    let registry = SessionRegistry::new();
    for i in 0..1000 {
        registry.resolve(&input(&format!("s{}", i))).unwrap();
    }
    let hit = input("s500");

    c.bench_function("registry_resolve_1000_sessions", |b| {
        b.iter(|| black_box(registry.resolve(black_box(&hit)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_resolve_existing,
    bench_create_session,
    bench_resolve_populated
);
criterion_main!(benches);
