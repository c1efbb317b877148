// ============================================================================
// lumen-ui - Conversions
// reactive / readonly / shallow entry points over observable containers
// ============================================================================

use tracing::error;

use crate::reactive::store::Variant;
use crate::reactive::value::Value;

fn convert(value: Value, variant: Variant, op: &'static str) -> Value {
    match value {
        Value::Obs(obs) => Value::Obs(obs.with_variant(variant)),
        other => {
            error!(op, value = ?other, "conversion requires an aggregate value");
            other
        }
    }
}

/// A deep, mutable observable view. Reads track, nested containers come back
/// reactive too.
pub fn reactive(value: Value) -> Value {
    convert(
        value,
        Variant {
            shallow: false,
            readonly: false,
        },
        "reactive",
    )
}

/// Like [`reactive`], but only the root level: nested containers read back raw.
pub fn shallow_reactive(value: Value) -> Value {
    convert(
        value,
        Variant {
            shallow: true,
            readonly: false,
        },
        "shallow_reactive",
    )
}

/// A deep readonly view. Writes at any depth are ignored with a warning.
pub fn readonly(value: Value) -> Value {
    convert(
        value,
        Variant {
            shallow: false,
            readonly: true,
        },
        "readonly",
    )
}

/// Readonly at the root only; nested containers read back raw and writable.
pub fn shallow_readonly(value: Value) -> Value {
    convert(
        value,
        Variant {
            shallow: true,
            readonly: true,
        },
        "shallow_readonly",
    )
}

/// Whether a value is a readonly container view.
pub fn is_readonly(value: &Value) -> bool {
    matches!(value, Value::Obs(o) if o.is_readonly())
}

/// Whether a value is an observable container (any variant).
pub fn is_reactive(value: &Value) -> bool {
    matches!(value, Value::Obs(_))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_are_idempotent_by_identity() {
        let base = Value::map([("a", Value::from(1))]);
        let ro = readonly(base.clone());
        let ro_again = readonly(ro.clone());
        assert_eq!(ro, ro_again);
        assert_ne!(base, ro);
    }

    #[test]
    fn readonly_of_reactive_shares_state() {
        let base = reactive(Value::map([("a", Value::from(1))]));
        let ro = readonly(base.clone());

        base.as_obs().unwrap().set("a", Value::from(2));
        assert_eq!(ro.as_obs().unwrap().get("a"), Value::from(2));
        assert!(is_readonly(&ro));
        assert!(!is_readonly(&base));
    }

    #[test]
    fn scalar_conversion_degrades_gracefully() {
        let v = reactive(Value::from(5));
        assert_eq!(v, Value::from(5));
        assert!(!is_reactive(&v));
    }
}
