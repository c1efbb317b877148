// ============================================================================
// lumen-ui - Reactivity Benchmarks
// ============================================================================

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lumen_ui::{EffectOptions, Value, computed, effect, lis_indices, reactive};

fn bench_effect_trigger(c: &mut Criterion) {
    c.bench_function("effect_trigger", |b| {
        let state = reactive(Value::map([("n", Value::from(0))]));
        let obs = state.as_obs().unwrap().clone();
        let o = obs.clone();
        let _e = effect(move || o.get("n"), EffectOptions::default());

        let mut i = 0.0;
        b.iter(|| {
            i += 1.0;
            obs.set("n", Value::from(black_box(i)));
        });
    });
}

fn bench_effect_fanout(c: &mut Criterion) {
    c.bench_function("effect_fanout_100", |b| {
        let state = reactive(Value::map([("n", Value::from(0))]));
        let obs = state.as_obs().unwrap().clone();
        let effects: Vec<_> = (0..100)
            .map(|_| {
                let o = obs.clone();
                effect(move || o.get("n"), EffectOptions::default())
            })
            .collect();

        let mut i = 0.0;
        b.iter(|| {
            i += 1.0;
            obs.set("n", Value::from(black_box(i)));
        });
        drop(effects);
    });
}

fn bench_computed_read(c: &mut Criterion) {
    c.bench_function("computed_cached_read", |b| {
        let state = reactive(Value::map([("n", Value::from(1))]));
        let obs = state.as_obs().unwrap().clone();
        let o = obs.clone();
        let derived = computed(move || Value::from(o.get("n").as_num().unwrap_or(0.0) * 2.0));
        derived.get();

        b.iter(|| black_box(derived.get()));
    });

    c.bench_function("computed_invalidate_and_read", |b| {
        let state = reactive(Value::map([("n", Value::from(1))]));
        let obs = state.as_obs().unwrap().clone();
        let o = obs.clone();
        let derived = computed(move || Value::from(o.get("n").as_num().unwrap_or(0.0) * 2.0));

        let mut i = 0.0;
        b.iter(|| {
            i += 1.0;
            obs.set("n", Value::from(i));
            black_box(derived.get())
        });
    });
}

fn bench_list_aggregation(c: &mut Criterion) {
    c.bench_function("list_sum_1000_tracked", |b| {
        let items = reactive(Value::list((0..1000).map(|n| Value::from(n as f64))));
        let obs = items.as_obs().unwrap().clone();

        b.iter(|| {
            let o = obs.clone();
            let e = effect(
                move || {
                    let mut sum = 0.0;
                    for i in 0..o.len() {
                        sum += o.get(i).as_num().unwrap_or(0.0);
                    }
                    Value::from(sum)
                },
                EffectOptions::default(),
            );
            black_box(e.run())
        });
    });
}

fn bench_lis(c: &mut Criterion) {
    c.bench_function("lis_1000", |b| {
        let arr: Vec<isize> = (0..1000).map(|i| ((i * 7919) % 1000) as isize).collect();
        b.iter(|| black_box(lis_indices(black_box(&arr))));
    });
}

criterion_group!(
    benches,
    bench_effect_trigger,
    bench_effect_fanout,
    bench_computed_read,
    bench_list_aggregation,
    bench_lis
);
criterion_main!(benches);
