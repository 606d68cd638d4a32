use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use json_delta_benches::available_corpora;
use json_delta_core::textdiff::TextDiffConfig;
use json_delta_core::{apply_diff, diff};

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    let cfg = TextDiffConfig::default();
    for corpus in available_corpora() {
        group.throughput(Throughput::Bytes(corpus.fixture_bytes() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(corpus.name()), &corpus, |b, corpus| {
            b.iter(|| {
                let op = diff(corpus.before(), corpus.after(), corpus.policy(), &cfg);
                black_box(op);
            });
        });
    }
    group.finish();
}

fn bench_patch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch-apply");
    let cfg = TextDiffConfig::default();
    for corpus in available_corpora() {
        let Some(op) = diff(corpus.before(), corpus.after(), corpus.policy(), &cfg) else {
            continue;
        };
        group.throughput(Throughput::Bytes(corpus.fixture_bytes() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                let patched = apply_diff(corpus.before(), &op, &cfg).expect("patch applies");
                black_box(patched);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diff, bench_patch_apply);
criterion_main!(benches);
