use criterion::{black_box, criterion_group, criterion_main, Criterion};
use homing_rl_core::{Action, Discretizer, Position, QTable, Reward};

fn q_update(c: &mut Criterion) {
    let discretizer = Discretizer::default();
    let states: Vec<_> = (0..1_000)
        .map(|i| {
            let t = f64::from(i) * 0.013;
            discretizer.discretize(Position::new(t.sin(), t.cos()))
        })
        .collect();

    c.bench_function("q_table_update", |b| {
        let mut table = QTable::default();
        b.iter(|| {
            for pair in states.windows(2) {
                for action in Action::ALL {
                    table.update(pair[0], action, Reward(black_box(1.5)), pair[1]);
                }
            }
        });
    });

    c.bench_function("discretize", |b| {
        b.iter(|| discretizer.discretize(black_box(Position::new(-0.4567, 0.3012))));
    });
}

criterion_group!(benches, q_update);
criterion_main!(benches);
