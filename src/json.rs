//! JSON deserialization dispatch
//!
//! Every type that can be read out of a bar config implements [`FromJson`].
//! The trait updates an existing value in place rather than building a new
//! one, so a default (or a preset) survives whenever the JSON node has the
//! wrong shape. There is no error path: a mismatched node is a no-op.
//!
//! ```ignore
//! let width: u32 = json_get(&doc["width"]);
//! json_get_to(&doc["modes"], &mut config.modes);
//! ```
//!
//! Types owned by this crate implement the trait directly, with access to
//! their private fields. Enums keyed by a string name go through
//! [`from_json_by_name!`](crate::from_json_by_name). A type that implements
//! none of these is rejected at compile time.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// In-place decoding from a JSON node
pub trait FromJson {
    /// Update `self` from `j`, leaving it untouched when `j` has the wrong shape
    fn from_json(&mut self, j: &Value);
}

/// Decode `j` into `dst` and hand `dst` back for chaining
pub fn json_get_to<'a, T: FromJson + ?Sized>(j: &Value, dst: &'a mut T) -> &'a mut T {
    dst.from_json(j);
    dst
}

/// Decode `j` into a fresh default-constructed `T`
pub fn json_get<T: FromJson + Default>(j: &Value) -> T {
    let mut dst = T::default();
    dst.from_json(j);
    dst
}

/// Implement [`FromJson`] for a type with a `fn from_name(&str) -> Option<Self>`.
/// Unknown names and non-string nodes leave the destination unchanged.
#[macro_export]
macro_rules! from_json_by_name {
    ($ty:ty) => {
        impl $crate::json::FromJson for $ty {
            fn from_json(&mut self, j: &serde_json::Value) {
                if let Some(v) = j.as_str().and_then(<$ty>::from_name) {
                    *self = v;
                }
            }
        }
    };
}

macro_rules! scalar_from_json {
    ($ty:ty, $conv:expr) => {
        impl FromJson for $ty {
            fn from_json(&mut self, j: &Value) {
                if let Some(v) = ($conv)(j) {
                    *self = v;
                }
            }
        }
    };
}

scalar_from_json!(bool, Value::as_bool);
scalar_from_json!(i32, |j: &Value| j.as_i64().and_then(|v| i32::try_from(v).ok()));
scalar_from_json!(i64, Value::as_i64);
scalar_from_json!(u32, |j: &Value| j.as_u64().and_then(|v| u32::try_from(v).ok()));
scalar_from_json!(u64, Value::as_u64);
scalar_from_json!(f64, Value::as_f64);
scalar_from_json!(String, |j: &Value| j.as_str().map(str::to_owned));

/// Raw passthrough, used for module configs that stay untyped
impl FromJson for Value {
    fn from_json(&mut self, j: &Value) {
        *self = j.clone();
    }
}

/// Null (or a missing key, which indexes to null) clears the option
impl<T: FromJson + Default> FromJson for Option<T> {
    fn from_json(&mut self, j: &Value) {
        *self = match j {
            Value::Null => None,
            _ => Some(json_get(j)),
        };
    }
}

/// Arrays replace the whole sequence, keeping source order
impl<T: FromJson + Default> FromJson for Vec<T> {
    fn from_json(&mut self, j: &Value) {
        if let Value::Array(items) = j {
            *self = items.iter().map(json_get).collect();
        }
    }
}

/// Objects merge key by key onto existing entries
impl<T: FromJson + Default> FromJson for BTreeMap<String, T> {
    fn from_json(&mut self, j: &Value) {
        if let Value::Object(obj) = j {
            for (key, value) in obj {
                json_get_to(value, self.entry(key.clone()).or_default());
            }
        }
    }
}

impl<T: FromJson + Default> FromJson for HashMap<String, T> {
    fn from_json(&mut self, j: &Value) {
        if let Value::Object(obj) = j {
            for (key, value) in obj {
                json_get_to(value, self.entry(key.clone()).or_default());
            }
        }
    }
}
