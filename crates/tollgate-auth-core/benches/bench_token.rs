//! Benchmarks for refresh-token hot paths

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tollgate_auth_core::{AuthConfig, RefreshClaims, TokenCodec};
use tollgate_types::UserId;

fn codec() -> TokenCodec {
    let config = AuthConfig::try_new("benchmark-secret-0123456789abcdefghij")
        .expect("benchmark secret is long enough");
    TokenCodec::new(&config)
}

fn bench_issue(c: &mut Criterion) {
    let codec = codec();

    c.bench_function("token_issue", |b| {
        b.iter(|| codec.issue(black_box(UserId(42))));
    });
}

fn bench_validate(c: &mut Criterion) {
    let codec = codec();
    let fresh = codec.issue(UserId(42)).expect("issue");
    let near_expiry = codec
        .sign(&RefreshClaims::new(
            UserId(42),
            Utc::now() - Duration::days(29),
            Duration::days(30) - Duration::hours(1),
        )
        .expect("claims"))
        .expect("sign");

    let mut group = c.benchmark_group("token_validate");

    group.bench_function("fresh", |b| {
        b.iter(|| codec.validate(black_box(&fresh), UserId(42)));
    });

    group.bench_function("subject_mismatch", |b| {
        b.iter(|| codec.validate(black_box(&fresh), UserId(7)));
    });

    group.bench_function("garbage", |b| {
        b.iter(|| codec.validate(black_box("not.a.token"), UserId(42)));
    });

    group.finish();

    c.bench_function("token_is_near_expiry", |b| {
        b.iter(|| codec.is_near_expiry(black_box(&near_expiry)));
    });
}

criterion_group!(benches, bench_issue, bench_validate);
criterion_main!(benches);
