// ============================================================================
// lumen-ui - Reactivity Integration Tests
// Observable state, effects, and references working together
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lumen_ui::{
    EffectOptions, RefView, Value, effect, is_readonly, reactive, readonly, ref_value,
    shallow_reactive, to_refs, untracked,
};

#[test]
fn effect_follows_a_nested_write() {
    let state = reactive(Value::map([(
        "user",
        Value::map([("name", Value::from("ada"))]),
    )]));
    let obs = state.as_obs().unwrap().clone();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let o = obs.clone();
    let s = seen.clone();
    let _e = effect(
        move || {
            let user = o.get("user");
            let name = user.as_obs().map(|u| u.get("name")).unwrap_or(Value::Null);
            s.borrow_mut().push(name);
            Value::Null
        },
        EffectOptions::default(),
    );

    let user = obs.get("user");
    user.as_obs().unwrap().set("name", Value::from("grace"));
    assert_eq!(
        *seen.borrow(),
        vec![Value::from("ada"), Value::from("grace")]
    );
}

#[test]
fn effect_aggregates_a_list() {
    let items = reactive(Value::list([Value::from(1), Value::from(2)]));
    let obs = items.as_obs().unwrap().clone();

    let total = Rc::new(Cell::new(0.0));
    let o = obs.clone();
    let t = total.clone();
    let _e = effect(
        move || {
            let mut sum = 0.0;
            for i in 0..o.len() {
                sum += o.get(i).as_num().unwrap_or(0.0);
            }
            t.set(sum);
            Value::Null
        },
        EffectOptions::default(),
    );
    assert_eq!(total.get(), 3.0);

    obs.push(Value::from(10));
    assert_eq!(total.get(), 13.0);

    obs.set(0usize, Value::from(5));
    assert_eq!(total.get(), 17.0);

    obs.pop();
    assert_eq!(total.get(), 7.0);
}

#[test]
fn untracked_reads_do_not_subscribe() {
    let state = reactive(Value::map([
        ("watched", Value::from(1)),
        ("peeked", Value::from(1)),
    ]));
    let obs = state.as_obs().unwrap().clone();

    let runs = Rc::new(Cell::new(0));
    let o = obs.clone();
    let r = runs.clone();
    let _e = effect(
        move || {
            r.set(r.get() + 1);
            let _ = o.get("watched");
            untracked(|| o.get("peeked"))
        },
        EffectOptions::default(),
    );
    assert_eq!(runs.get(), 1);

    obs.set("peeked", Value::from(2));
    assert_eq!(runs.get(), 1);

    obs.set("watched", Value::from(2));
    assert_eq!(runs.get(), 2);
}

#[test]
fn readonly_view_tracks_nothing_and_absorbs_writes() {
    let state = reactive(Value::map([("n", Value::from(1))]));
    let ro = readonly(state.clone());
    assert!(is_readonly(&ro));
    let ro_obs = ro.as_obs().unwrap().clone();

    let runs = Rc::new(Cell::new(0));
    let o = ro_obs.clone();
    let r = runs.clone();
    let _e = effect(
        move || {
            r.set(r.get() + 1);
            o.get("n")
        },
        EffectOptions::default(),
    );
    assert_eq!(runs.get(), 1);

    // Write through the mutable handle; the readonly reader never tracked
    state.as_obs().unwrap().set("n", Value::from(2));
    assert_eq!(runs.get(), 1);
    assert_eq!(ro_obs.get("n"), Value::from(2));

    // Writes through the readonly handle are absorbed
    ro_obs.set("n", Value::from(99));
    assert_eq!(ro_obs.get("n"), Value::from(2));
}

#[test]
fn shallow_reactive_root_tracks_nested_does_not_rewrap() {
    let state = shallow_reactive(Value::map([(
        "inner",
        Value::map([("n", Value::from(1))]),
    )]));
    let obs = state.as_obs().unwrap().clone();

    let runs = Rc::new(Cell::new(0));
    let o = obs.clone();
    let r = runs.clone();
    let _e = effect(
        move || {
            r.set(r.get() + 1);
            o.get("inner")
        },
        EffectOptions::default(),
    );
    assert_eq!(runs.get(), 1);

    // Replacing the root field triggers
    obs.set("inner", Value::map([("n", Value::from(2))]));
    assert_eq!(runs.get(), 2);
}

#[test]
fn refs_survive_destructuring_through_to_refs() {
    let state = reactive(Value::map([
        ("x", Value::from(1)),
        ("y", Value::from(2)),
    ]));
    let obs = state.as_obs().unwrap().clone();
    let refs = to_refs(&obs);

    let x = refs.as_obs().unwrap().get("x");
    let x_obs = x.as_obs().unwrap().clone();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let xo = x_obs.clone();
    let _e = effect(
        move || {
            s.borrow_mut().push(xo.get("value"));
            Value::Null
        },
        EffectOptions::default(),
    );

    obs.set("x", Value::from(10));
    assert_eq!(*seen.borrow(), vec![Value::from(1), Value::from(10)]);
}

#[test]
fn ref_view_scope_reads_and_writes() {
    let scope = reactive(Value::map([
        ("count", ref_value(Value::from(0))),
        ("label", Value::from("clicks")),
    ]));
    let view = RefView::new(scope.as_obs().unwrap().clone());

    let seen = Rc::new(RefCell::new(Vec::new()));
    // Reads through the view unwrap the ref transparently
    {
        let scope_obs = scope.as_obs().unwrap().clone();
        let s = seen.clone();
        let _e = effect(
            move || {
                let v = RefView::new(scope_obs.clone()).get("count");
                s.borrow_mut().push(v);
                Value::Null
            },
            EffectOptions::default(),
        );

        view.set("count", Value::from(1));
        view.set("count", Value::from(2));
    }
    assert_eq!(
        *seen.borrow(),
        vec![Value::from(0), Value::from(1), Value::from(2)]
    );
    assert_eq!(view.get("label"), Value::from("clicks"));
}
