use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_engine::{ChangeSource, Delta, Engine, EngineOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_engine(char_count: usize) -> Engine {
    let mut engine = Engine::new(EngineOptions::default()).unwrap();
    let text = "the quick brown fox jumps over the lazy dog\n".repeat(char_count / 44 + 1);
    engine
        .set_contents(Delta::new().insert(text), ChangeSource::Silent)
        .unwrap();
    engine
}

fn bench_random_inserts(c: &mut Criterion) {
    c.bench_function("random_inserts/1000", |b| {
        b.iter_batched(
            || (seeded_engine(100_000), StdRng::seed_from_u64(7)),
            |(mut engine, mut rng)| {
                for _ in 0..1000 {
                    let offset = rng.gen_range(0..=engine.document().len_chars());
                    let delta = Delta::new().retain(offset).insert("x");
                    engine
                        .update_contents(black_box(&delta), ChangeSource::Api)
                        .unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contents_snapshot(c: &mut Criterion) {
    let engine = seeded_engine(100_000);
    c.bench_function("contents_snapshot/100k_chars", |b| {
        b.iter(|| black_box(engine.contents()))
    });
}

criterion_group!(benches, bench_random_inserts, bench_contents_snapshot);
criterion_main!(benches);
