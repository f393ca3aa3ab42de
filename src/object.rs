//! A plain, JSON-like view of NBT data.
//!
//! This throws away the tags: a `Byte` and a `Long` both become JSON numbers,
//! a `List` and an `IntArray` both become JSON arrays. That makes it handy for
//! reading values out or showing them to people, but the result cannot be
//! turned back into the same bytes. Keep the [`Value`] tree if you need to
//! encode again, or use a [`Schema`][crate::Schema] to say what the tags
//! should be.
//!
//! ```
//! use nbtree::{object::to_object, Compound};
//! use serde_json::json;
//!
//! let mut entries = Compound::new();
//! entries.insert("name", "Steve");
//! entries.insert("health", 20.0f32);
//!
//! assert_eq!(
//!     serde_json::Value::Object(to_object(&entries)),
//!     json!({ "name": "Steve", "health": 20.0 }),
//! );
//! ```
use serde_json::{Map, Number};

use crate::{Compound, Value};

/// Project named entries into a JSON object. If a name occurs more than once
/// the last value wins, in the position of the first.
pub fn to_object(entries: &Compound) -> Map<String, serde_json::Value> {
    entries
        .iter()
        .map(|(name, value)| (name.clone(), to_json(value)))
        .collect()
}

/// Project a single value. Floats that JSON cannot hold (NaN, infinities)
/// become `null`.
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Byte(v) => Json::from(*v),
        Value::Short(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Float(v) => float(*v as f64),
        Value::Double(v) => float(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::ByteArray(a) => a.iter().copied().map(Json::from).collect(),
        Value::IntArray(a) => a.iter().copied().map(Json::from).collect(),
        Value::LongArray(a) => a.iter().copied().map(Json::from).collect(),
        Value::List(l) => l.iter().map(to_json).collect(),
        Value::Compound(c) => Json::Object(to_object(c)),
    }
}

fn float(v: f64) -> serde_json::Value {
    Number::from_f64(v).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
