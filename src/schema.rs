//! Describe the shape of some data once, then turn any value of that shape
//! into NBT and back.
//!
//! Plain data (JSON, or anything `serde` can serialize) does not say which NBT
//! tag each number should be written as. A [`Schema`] fills that in:
//!
//! * a primitive token such as [`Schema::INT`] fixes the tag of a scalar or
//!   array,
//! * [`Schema::list`] describes a list whose elements all share one schema,
//! * [`Schema::record`] describes a compound with a fixed set of fields,
//! * [`Schema::map`] describes a compound whose keys are only known at runtime
//!   (a palette keyed by block name, say), applying one schema to every key.
//!
//! Integer tags accept any whole number in range, including floats such as
//! `64.0`, so structs with `f64` fields can still map to integer tags.
//!
//! NBT has no null. Fields that are `null` or missing are left out of
//! compounds, so they do not survive a round trip as nulls. A `null` where it
//! cannot be left out, like a list element, is an error.
//!
//! ```
//! use nbtree::schema::{flatten, parse, Schema};
//! use nbtree::Value;
//! use serde_json::json;
//!
//! let schema: Schema = serde_json::from_value(json!({
//!     "Name": "string",
//!     "Count": "byte",
//!     "Lore": ["string"],
//! }))
//! .unwrap();
//!
//! let item = json!({ "Name": "Diamond", "Count": 64, "Lore": null });
//! let value = flatten(&item, &schema).unwrap();
//!
//! let entries = value.as_compound().unwrap();
//! assert_eq!(entries["Count"], Value::Byte(64));
//! assert!(!entries.contains_key("Lore"));
//!
//! assert_eq!(parse(&value, &schema).unwrap(), json!({ "Name": "Diamond", "Count": 64 }));
//! ```
//!
//! # Schemas as JSON
//!
//! Schemas can be loaded from configuration with [`Schema::from_json`] or
//! through `serde`:
//!
//! * `"byte"`, `"short"`, `"int"`, `"long"`, `"float"`, `"double"`,
//!   `"byte_array"`, `"string"`, `"int_array"`, `"long_array"`,
//! * `[s]` for a list of `s`, and `[]` for a list that must be empty,
//! * `{"*": s}` for a dynamically keyed compound of `s`,
//! * any other object for a compound with those fields.
use std::fmt;

use indexmap::IndexMap;
use log::trace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::{Error, Result};
use crate::{object, Compound, Document, List, Tag, Value};

/// Key that marks a dynamically keyed compound in JSON schemas.
pub const DYNAMIC_KEY: &str = "*";

/// The shape of a value. See the [module documentation][self].
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A scalar or array with the given tag. `End`, `List` and `Compound`
    /// are not primitives and fail when used.
    Primitive(Tag),
    /// A list whose elements all have the given schema. `None` is a list that
    /// must be empty and is written as an empty list of `End`.
    List(Option<Box<Schema>>),
    /// A compound with these fields, written in this order.
    Record(IndexMap<String, Schema>),
    /// A compound with any keys, each value having this schema.
    Map(Box<Schema>),
}

impl Schema {
    pub const BYTE: Schema = Schema::Primitive(Tag::Byte);
    pub const SHORT: Schema = Schema::Primitive(Tag::Short);
    pub const INT: Schema = Schema::Primitive(Tag::Int);
    pub const LONG: Schema = Schema::Primitive(Tag::Long);
    pub const FLOAT: Schema = Schema::Primitive(Tag::Float);
    pub const DOUBLE: Schema = Schema::Primitive(Tag::Double);
    pub const BYTE_ARRAY: Schema = Schema::Primitive(Tag::ByteArray);
    pub const STRING: Schema = Schema::Primitive(Tag::String);
    pub const INT_ARRAY: Schema = Schema::Primitive(Tag::IntArray);
    pub const LONG_ARRAY: Schema = Schema::Primitive(Tag::LongArray);

    /// A primitive schema for `tag`, failing for tags that are not primitive.
    pub fn primitive(tag: Tag) -> Result<Schema> {
        if is_primitive(tag) {
            Ok(Schema::Primitive(tag))
        } else {
            Err(Error::schema_mismatch(
                "",
                format!("{:?} is not a primitive tag", tag),
            ))
        }
    }

    pub fn list(element: Schema) -> Schema {
        Schema::List(Some(Box::new(element)))
    }

    pub fn empty_list() -> Schema {
        Schema::List(None)
    }

    pub fn record<K, I>(fields: I) -> Schema
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Schema::Record(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    pub fn map(value: Schema) -> Schema {
        Schema::Map(Box::new(value))
    }

    /// The tag values of this schema are written with.
    pub fn tag(&self) -> Tag {
        match self {
            Schema::Primitive(tag) => *tag,
            Schema::List(_) => Tag::List,
            Schema::Record(_) | Schema::Map(_) => Tag::Compound,
        }
    }

    /// Read a schema from its JSON description.
    pub fn from_json(json: &Json) -> Result<Schema> {
        schema_from_json(json, Path::Root)
    }
}

fn schema_from_json(json: &Json, path: Path<'_>) -> Result<Schema> {
    match json {
        Json::String(token) => primitive_token(token)
            .map(Schema::Primitive)
            .ok_or_else(|| mismatch(path, format!("unknown schema token {:?}", token))),
        Json::Array(elements) => match elements.as_slice() {
            [] => Ok(Schema::empty_list()),
            [element] => Ok(Schema::list(schema_from_json(element, Path::Index(&path, 0))?)),
            _ => Err(mismatch(
                path,
                format!(
                    "list schema declares {} element types, lists hold one",
                    elements.len()
                ),
            )),
        },
        Json::Object(fields) => match fields.get(DYNAMIC_KEY) {
            Some(inner) if fields.len() == 1 => Ok(Schema::map(schema_from_json(
                inner,
                Path::Key(&path, DYNAMIC_KEY),
            )?)),
            _ => {
                let mut record = IndexMap::with_capacity(fields.len());
                for (key, field) in fields {
                    record.insert(key.clone(), schema_from_json(field, Path::Key(&path, key))?);
                }
                Ok(Schema::Record(record))
            }
        },
        other => Err(mismatch(
            path,
            format!("{} is not a schema", describe(other)),
        )),
    }
}

fn primitive_token(token: &str) -> Option<Tag> {
    Some(match token {
        "byte" => Tag::Byte,
        "short" => Tag::Short,
        "int" => Tag::Int,
        "long" => Tag::Long,
        "float" => Tag::Float,
        "double" => Tag::Double,
        "byte_array" => Tag::ByteArray,
        "string" => Tag::String,
        "int_array" => Tag::IntArray,
        "long_array" => Tag::LongArray,
        _ => return None,
    })
}

fn is_primitive(tag: Tag) -> bool {
    !matches!(tag, Tag::End | Tag::List | Tag::Compound)
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = Json::deserialize(deserializer)?;
        Schema::from_json(&json).map_err(serde::de::Error::custom)
    }
}

/// Where in a value we are, for error messages. Only rendered on failure.
#[derive(Clone, Copy)]
enum Path<'a> {
    Root,
    Key(&'a Path<'a>, &'a str),
    Index(&'a Path<'a>, usize),
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => Ok(()),
            Path::Key(Path::Root, key) => f.write_str(key),
            Path::Index(Path::Root, i) => write!(f, "{}", i),
            Path::Key(parent, key) => write!(f, "{}.{}", parent, key),
            Path::Index(parent, i) => write!(f, "{}.{}", parent, i),
        }
    }
}

fn mismatch(path: Path<'_>, msg: impl fmt::Display) -> Error {
    Error::schema_mismatch(&path.to_string(), msg)
}

fn describe(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn expected(what: &str, found: &Json) -> String {
    format!("expected {}, found {}", what, describe(found))
}

/// Turn `value` into an NBT value following `schema`.
pub fn flatten(value: &Json, schema: &Schema) -> Result<Value> {
    flatten_at(value, schema, Path::Root)
}

/// [`flatten`] anything `serde` can serialize.
pub fn flatten_serialize<T>(value: &T, schema: &Schema) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_value(value)?;
    flatten(&json, schema)
}

/// Flatten `value` into a complete document with the given root name. The
/// schema must describe a compound.
pub fn flatten_document(name: impl Into<String>, value: &Json, schema: &Schema) -> Result<Document> {
    let name = name.into();
    match flatten(value, schema)? {
        Value::Compound(root) => {
            trace!("flattened document {:?} with {} root entries", name, root.len());
            Ok(Document { name, root })
        }
        other => Err(mismatch(
            Path::Root,
            format!("document root must be a compound, schema gives {:?}", other.tag()),
        )),
    }
}

/// Serialize `value` through `schema` into the bytes of a document with an
/// empty root name.
pub fn to_bytes_with_schema<T>(value: &T, schema: &Schema) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_value(value)?;
    let doc = flatten_document("", &json, schema)?;
    crate::to_bytes(&doc)
}

fn flatten_at(value: &Json, schema: &Schema, path: Path<'_>) -> Result<Value> {
    if value.is_null() {
        return Err(Error::unrepresentable(&path.to_string()));
    }

    match schema {
        Schema::Primitive(tag) => flatten_primitive(value, *tag, path),
        Schema::List(None) => match value {
            Json::Array(a) if a.is_empty() => Ok(Value::List(List::empty())),
            Json::Array(a) => Err(mismatch(
                path,
                format!("expected an empty array, found {} elements", a.len()),
            )),
            other => Err(mismatch(path, expected("an array", other))),
        },
        Schema::List(Some(element)) => {
            let array = value
                .as_array()
                .ok_or_else(|| mismatch(path, expected("an array", value)))?;

            let items = array
                .iter()
                .enumerate()
                .map(|(i, v)| flatten_at(v, element, Path::Index(&path, i)))
                .collect::<Result<Vec<_>>>()?;

            Ok(Value::List(List {
                element: element.tag(),
                items,
            }))
        }
        Schema::Record(fields) => {
            let object = as_object(value, path)?;
            let mut compound = Compound::with_capacity(fields.len());
            for (key, field) in fields {
                match object.get(key) {
                    None | Some(Json::Null) => {}
                    Some(v) => compound.push(key.clone(), flatten_at(v, field, Path::Key(&path, key))?),
                }
            }
            Ok(Value::Compound(compound))
        }
        Schema::Map(inner) => {
            let object = as_object(value, path)?;
            let mut compound = Compound::with_capacity(object.len());
            for (key, v) in object {
                if !v.is_null() {
                    compound.push(key.clone(), flatten_at(v, inner, Path::Key(&path, key))?);
                }
            }
            Ok(Value::Compound(compound))
        }
    }
}

fn as_object<'v>(value: &'v Json, path: Path<'_>) -> Result<&'v Map<String, Json>> {
    value
        .as_object()
        .ok_or_else(|| mismatch(path, expected("an object", value)))
}

fn flatten_primitive(value: &Json, tag: Tag, path: Path<'_>) -> Result<Value> {
    Ok(match tag {
        Tag::Byte => match value {
            Json::Bool(b) => Value::Byte(i8::from(*b)),
            _ => Value::Byte(integer(value, 8, path)? as i8),
        },
        Tag::Short => Value::Short(integer(value, 16, path)? as i16),
        Tag::Int => Value::Int(integer(value, 32, path)? as i32),
        Tag::Long => Value::Long(integer(value, 64, path)? as i64),
        Tag::Float => Value::Float(float(value, path)? as f32),
        Tag::Double => Value::Double(float(value, path)?),
        Tag::String => match value {
            Json::String(s) => Value::String(s.clone()),
            other => return Err(mismatch(path, expected("a string", other))),
        },
        Tag::ByteArray => Value::ByteArray(integers(value, 8, path, |v| v as i8)?),
        Tag::IntArray => Value::IntArray(integers(value, 32, path, |v| v as i32)?),
        Tag::LongArray => Value::LongArray(integers(value, 64, path, |v| v as i64)?),
        Tag::End | Tag::List | Tag::Compound => {
            return Err(mismatch(path, format!("{:?} is not a primitive tag", tag)))
        }
    })
}

/// An integer that fits in `bits` bits, either signed or unsigned. Unsigned
/// values past the signed range wrap when the caller narrows them. Floats
/// with no fractional part are accepted too.
fn integer(value: &Json, bits: u32, path: Path<'_>) -> Result<i128> {
    let n = match value {
        Json::Number(n) => n,
        Json::Null => return Err(Error::unrepresentable(&path.to_string())),
        other => return Err(mismatch(path, expected("an integer", other))),
    };

    let v = match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => i as i128,
        (None, Some(u), _) => u as i128,
        // Whole floats such as `3.0` count as integers. The cast saturates,
        // and the range check below rejects anything that did.
        (None, None, Some(f)) if f.is_finite() && f.fract() == 0.0 => f as i128,
        _ => return Err(mismatch(path, format!("expected an integer, found {}", n))),
    };

    let min = -(1i128 << (bits - 1));
    let max = (1i128 << bits) - 1;
    if v < min || v > max {
        return Err(mismatch(
            path,
            format!("{} does not fit in {} bits", v, bits),
        ));
    }
    Ok(v)
}

fn integers<T>(value: &Json, bits: u32, path: Path<'_>, narrow: fn(i128) -> T) -> Result<Vec<T>> {
    let array = value
        .as_array()
        .ok_or_else(|| mismatch(path, expected("an array of integers", value)))?;

    array
        .iter()
        .enumerate()
        .map(|(i, v)| integer(v, bits, Path::Index(&path, i)).map(narrow))
        .collect()
}

fn float(value: &Json, path: Path<'_>) -> Result<f64> {
    match value {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| mismatch(path, format!("{} is not representable as a float", n))),
        other => Err(mismatch(path, expected("a number", other))),
    }
}

/// Check a decoded value against `schema` and project it into plain data.
///
/// Tags must match the schema exactly, except that an empty list of any
/// element tag satisfies any list schema. Record fields missing from the data
/// are left out of the result, and entries the schema does not mention are
/// ignored.
pub fn parse(value: &Value, schema: &Schema) -> Result<Json> {
    parse_at(value, schema, Path::Root)
}

/// Check `entries` against a record or map `schema` and deserialize them into
/// a `T`.
pub fn from_compound<T>(entries: &Compound, schema: &Schema) -> Result<T>
where
    T: DeserializeOwned,
{
    let json = parse_compound(entries, schema, Path::Root)?;
    Ok(serde_json::from_value(Json::Object(json))?)
}

/// Decode a document and deserialize its root compound through `schema`.
pub fn from_bytes_with_schema<T>(buf: &[u8], schema: &Schema) -> Result<T>
where
    T: DeserializeOwned,
{
    let doc = crate::from_bytes(buf)?;
    from_compound(&doc.root, schema)
}

fn parse_at(value: &Value, schema: &Schema, path: Path<'_>) -> Result<Json> {
    match (schema, value) {
        (Schema::Primitive(tag), v) if is_primitive(*tag) && v.tag() == *tag => {
            Ok(object::to_json(v))
        }
        (Schema::List(None), Value::List(l)) if l.is_empty() => Ok(Json::Array(vec![])),
        (Schema::List(Some(element)), Value::List(l)) => {
            if !l.is_empty() && l.element != element.tag() {
                return Err(mismatch(
                    path,
                    format!("expected list of {:?}, found list of {:?}", element.tag(), l.element),
                ));
            }

            l.iter()
                .enumerate()
                .map(|(i, v)| parse_at(v, element, Path::Index(&path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Json::Array)
        }
        (Schema::Record(_) | Schema::Map(_), Value::Compound(c)) => {
            parse_compound(c, schema, path).map(Json::Object)
        }
        (schema, value) => Err(mismatch(
            path,
            format!("expected {}, found {:?}", schema_name(schema), value.tag()),
        )),
    }
}

fn parse_compound(entries: &Compound, schema: &Schema, path: Path<'_>) -> Result<Map<String, Json>> {
    let mut object = Map::new();
    match schema {
        Schema::Record(fields) => {
            for (key, field) in fields {
                if let Some(v) = entries.get(key) {
                    object.insert(key.clone(), parse_at(v, field, Path::Key(&path, key))?);
                }
            }
        }
        Schema::Map(inner) => {
            for (key, v) in entries {
                object.insert(key.clone(), parse_at(v, inner, Path::Key(&path, key))?);
            }
        }
        other => {
            return Err(mismatch(
                path,
                format!("expected a record or map schema, found {}", schema_name(other)),
            ))
        }
    }
    Ok(object)
}

fn schema_name(schema: &Schema) -> String {
    match schema {
        Schema::Primitive(tag) => format!("{:?}", tag),
        Schema::List(None) => "an empty List".to_owned(),
        Schema::List(Some(element)) => format!("List of {}", schema_name(element)),
        Schema::Record(_) => "Compound record".to_owned(),
        Schema::Map(_) => "Compound map".to_owned(),
    }
}
