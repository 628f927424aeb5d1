//! Submission-path throughput benchmark.
//!
//! Measures the synchronous pre-admission work (validation + payload build)
//! and raw admission throughput with an immediately-draining rate limit,
//! using Criterion.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ismp_gateway::{validation, Document, Product, RateLimitConfig};

fn sample_document() -> Document {
    Document {
        description: Some("benchmark batch".to_string()),
        doc_id: Some("doc-bench".to_string()),
        doc_status: Some("DRAFT".to_string()),
        doc_type: Some("LP_INTRODUCE_GOODS".to_string()),
        import_request: Some(false),
        owner_inn: Some("7700000000".to_string()),
        participant_inn: Some("7700000001".to_string()),
        producer_inn: Some("7700000002".to_string()),
        production_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
        production_type: Some("OWN_PRODUCTION".to_string()),
        reg_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2),
        reg_number: Some("reg-bench".to_string()),
        products: Some(Product {
            certificate_document_date: chrono::NaiveDate::from_ymd_opt(2024, 4, 1),
            certificate_document_number: Some("cert-bench".to_string()),
            production_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
            tnved_code: Some("0401".to_string()),
            uit_code: Some("uit-bench".to_string()),
            uitu_code: Some("uitu-bench".to_string()),
        }),
    }
}

fn bench_validation(c: &mut Criterion) {
    let document = sample_document();
    c.bench_function("validate_document", |b| {
        b.iter(|| validation::validate_document(black_box(&document)).unwrap())
    });
}

fn bench_payload_build(c: &mut Criterion) {
    let document = sample_document();
    c.bench_function("payload_build", |b| {
        b.iter(|| black_box(&document).to_body().unwrap())
    });
}

fn bench_tick_interval(c: &mut Criterion) {
    c.bench_function("tick_interval", |b| {
        b.iter(|| {
            let config = RateLimitConfig::new(
                black_box(std::time::Duration::from_secs(60)),
                black_box(20),
            )
            .unwrap();
            config.tick_interval()
        })
    });
}

criterion_group!(
    benches,
    bench_validation,
    bench_payload_build,
    bench_tick_interval
);
criterion_main!(benches);
