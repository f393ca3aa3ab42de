use std::ops::Index;

use crate::error::{Error, Result};
use crate::Tag;

/// Value is a complete NBT value. It owns its data. Compounds and Lists are
/// recursive, and every payload keeps the tag it was read with, so a `Value`
/// can always be written back out as exactly the same bytes.
///
/// ```
/// # use nbtree::{Compound, Value};
/// let mut compound = Compound::new();
/// compound.insert("DataVersion", 3465);
///
/// match compound["DataVersion"] {
///     Value::Int(ver) => println!("Version: {}", ver),
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// A homogeneous NBT list.
///
/// The element tag is stored separately from the items so that an empty list
/// remembers what it was declared as. Files in the wild contain empty lists
/// declared as `Compound`, `Int` and so on, and those must re-encode
/// unchanged. A freshly made empty list uses `End`.
///
/// The fields are public. The writer checks that every item matches
/// `element`, and that an `End` list is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub element: Tag,
    pub items: Vec<Value>,
}

/// One level of named entries: the body of an NBT compound.
///
/// Entries stay in the order they were read or inserted. Names are expected to
/// be unique but this is not enforced: [`push`][Compound::push] appends
/// whatever it is given, and decoding keeps duplicates so they survive a round
/// trip. [`insert`][Compound::insert] replaces an existing entry instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    pub(crate) entries: Vec<(String, Value)>,
}

/// A whole NBT file: one named root compound. The name is usually empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub name: String,
    pub root: Compound,
}

impl Value {
    /// The tag this value is encoded with.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::String(_) => Tag::String,
            Value::List(_) => Tag::List,
            Value::Compound(_) => Tag::Compound,
            Value::IntArray(_) => Tag::IntArray,
            Value::LongArray(_) => Tag::LongArray,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            Value::Float(v) => Some(v as i64),
            Value::Double(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Byte(v) => Some(v as f64),
            Value::Short(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            Value::Long(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Value::Compound(v) => Some(v),
            _ => None,
        }
    }
}

impl List {
    /// An empty list of `End`, what the format uses for "no elements, no
    /// declared type".
    pub fn empty() -> Self {
        Self::with_element(Tag::End)
    }

    /// An empty list that still declares its element tag.
    pub fn with_element(element: Tag) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// Make a list from some values, taking the element tag from the first.
    /// Fails if the values do not all have the same tag.
    pub fn of(items: Vec<Value>) -> Result<Self> {
        let element = items.first().map_or(Tag::End, Value::tag);
        let list = Self { element, items };
        list.check()?;
        Ok(list)
    }

    /// Append an item, which must match the element tag. Pushing onto an empty
    /// `End` list adopts the item's tag.
    pub fn push(&mut self, item: impl Into<Value>) -> Result<()> {
        let item = item.into();
        if self.element == Tag::End && self.items.is_empty() {
            self.element = item.tag();
        }

        if item.tag() != self.element {
            return Err(Error::invalid_list(format!(
                "cannot push {:?} onto list of {:?}",
                item.tag(),
                self.element
            )));
        }

        self.items.push(item);
        Ok(())
    }

    /// Check the list can be encoded: items of one tag, matching `element`.
    pub fn check(&self) -> Result<()> {
        if self.element == Tag::End && !self.items.is_empty() {
            return Err(Error::invalid_list(format!(
                "list of 'end' must be empty, has {} items",
                self.items.len()
            )));
        }

        match self.items.iter().position(|v| v.tag() != self.element) {
            Some(i) => Err(Error::invalid_list(format!(
                "list of {:?} has item {} of {:?}",
                self.element,
                i,
                self.items[i].tag()
            ))),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl Default for List {
    fn default() -> Self {
        Self::empty()
    }
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry without looking for an existing one of the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Set the entry called `name`, replacing and returning the first existing
    /// one in place, or appending if there is none.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(existing) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the first entry called `name`, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let i = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(i).1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }
}

impl Index<&str> for Compound {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no entry named {:?} in compound", name),
        }
    }
}

impl From<Vec<(String, Value)>> for Compound {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for Compound
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Compound {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Compound {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Document {
    pub fn new(name: impl Into<String>, root: Compound) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

impl From<Compound> for Document {
    fn from(root: Compound) -> Self {
        Self::new("", root)
    }
}

// ------------- From<T> impls -------------

macro_rules! from {
    ($type:ty, $variant:ident $(, $($part:tt)+)?) => {
        impl From<$type> for Value {
            fn from(val: $type) -> Self {
                Self::$variant(val$($($part)+)?)
            }
        }
        impl From<&$type> for Value {
            fn from(val: &$type) -> Self {
                Self::$variant(val.to_owned()$($($part)+)?)
            }
        }
    };
}
from!(i8, Byte);
from!(u8, Byte, as i8);
from!(i16, Short);
from!(u16, Short, as i16);
from!(i32, Int);
from!(u32, Int, as i32);
from!(i64, Long);
from!(u64, Long, as i64);
from!(f32, Float);
from!(f64, Double);
from!(String, String);
from!(&str, String, .to_owned());
from!(Vec<i8>, ByteArray);
from!(Vec<i32>, IntArray);
from!(Vec<i64>, LongArray);
from!(List, List);
from!(Compound, Compound);

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Self::Byte(i8::from(val))
    }
}

#[cfg(feature = "arbitrary1")]
fn het_list<'a, T, F>(u: &mut arbitrary::Unstructured<'a>, f: F) -> arbitrary::Result<Vec<Value>>
where
    F: FnMut(T) -> Value,
    T: arbitrary::Arbitrary<'a>,
{
    Ok(u.arbitrary_iter::<T>()?
        .collect::<arbitrary::Result<Vec<_>>>()?
        .into_iter()
        .map(f)
        .collect())
}

#[cfg(feature = "arbitrary1")]
impl<'a> arbitrary::Arbitrary<'a> for List {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        use Value::*;

        let element = u.arbitrary::<Tag>()?;
        let items = match element {
            Tag::End => vec![],
            Tag::Byte => het_list(u, Byte)?,
            Tag::Short => het_list(u, Short)?,
            Tag::Int => het_list(u, Int)?,
            Tag::Long => het_list(u, Long)?,
            Tag::Float => het_list(u, Float)?,
            Tag::Double => het_list(u, Double)?,
            Tag::ByteArray => het_list(u, ByteArray)?,
            Tag::String => het_list(u, String)?,
            Tag::List => het_list(u, List)?,
            Tag::Compound => het_list(u, Compound)?,
            Tag::IntArray => het_list(u, IntArray)?,
            Tag::LongArray => het_list(u, LongArray)?,
        };

        Ok(Self { element, items })
    }
}

#[cfg(feature = "arbitrary1")]
impl<'a> arbitrary::Arbitrary<'a> for Compound {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self {
            entries: u.arbitrary()?,
        })
    }
}

#[cfg(feature = "arbitrary1")]
impl<'a> arbitrary::Arbitrary<'a> for Value {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        use Value::*;

        Ok(match u.arbitrary::<Tag>()? {
            Tag::End => return Err(arbitrary::Error::IncorrectFormat),
            Tag::Byte => Byte(u.arbitrary()?),
            Tag::Short => Short(u.arbitrary()?),
            Tag::Int => Int(u.arbitrary()?),
            Tag::Long => Long(u.arbitrary()?),
            Tag::Float => Float(u.arbitrary()?),
            Tag::Double => Double(u.arbitrary()?),
            Tag::ByteArray => ByteArray(u.arbitrary()?),
            Tag::String => String(u.arbitrary()?),
            Tag::List => List(u.arbitrary()?),
            Tag::Compound => Compound(u.arbitrary()?),
            Tag::IntArray => IntArray(u.arbitrary()?),
            Tag::LongArray => LongArray(u.arbitrary()?),
        })
    }
}
