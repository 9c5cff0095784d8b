//! Desired-versus-remote attribute comparison
//!
//! The comparison is one-directional: a declared attribute differs only when
//! the remote entity carries the same attribute with another value.
//! Attributes only the remote side carries are ignored, and so are declared
//! attributes the remote side never returns (write-only fields such as a user
//! password). Identity attributes (`id`, `links`) are never compared, and a
//! declared `null` means "no opinion".
//!
//! Numbers compare by value, so `4` and `4.0` are equal.

use seeder_types::AttributeMap;
use serde_json::Value;

/// Attributes skipped by the comparison
pub const IDENTITY_ATTRIBUTES: [&str; 2] = ["id", "links"];

/// Names of declared attributes the remote entity does not satisfy
///
/// An empty result means no update is needed. Names are returned in the
/// declared map's order.
#[must_use]
pub fn mismatched_attributes(desired: &AttributeMap, remote: &AttributeMap) -> Vec<String> {
    desired
        .iter()
        .filter(|(name, _)| !IDENTITY_ATTRIBUTES.contains(&name.as_str()))
        .filter(|(_, wanted)| !wanted.is_null())
        .filter(|(name, wanted)| {
            remote
                .get(name.as_str())
                .is_some_and(|actual| !values_equal(wanted, actual))
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Check if the remote entity satisfies every declared attribute
#[inline]
#[must_use]
pub fn attributes_match(desired: &AttributeMap, remote: &AttributeMap) -> bool {
    mismatched_attributes(desired, remote).is_empty()
}

/// Deep equality with numeric normalization
///
/// Nested maps and lists must match exactly (same keys, same length); only
/// the top level of an entity is compared one-directionally.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => (x - y).abs() <= f64::EPSILON * x.abs().max(y.abs()),
                    _ => false,
                }
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}
