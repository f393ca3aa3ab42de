//! nbtree reads and writes NBT (Named Binary Tag), the tagged, big-endian
//! binary tree format used by *Minecraft: Java Edition* for world data,
//! player files and structure/schematic files.
//!
//! * For decoding bytes into a tree, see [`de`] and [`from_bytes`].
//! * For encoding a tree back into bytes, see [`ser`] and [`to_bytes`].
//! * For comparing trees regardless of compound entry order, see
//!   [`canonical`].
//! * For a plain JSON-like view of a tree, see [`object`].
//! * For describing the shape of your data once and serializing anything of
//!   that shape, see [`schema`].
//!
//! Compression is not handled here. Most files on disk are GZip or Zlib
//! compressed, so decompress first (`flate2` works well) and hand the raw
//! bytes over.
//!
//! # Quick example
//!
//! ```
//! use nbtree::schema::{flatten_document, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::record([
//!     ("Version", Schema::INT),
//!     ("Size", Schema::list(Schema::SHORT)),
//!     ("Palette", Schema::map(Schema::INT)),
//! ]);
//!
//! let value = json!({
//!     "Version": 2,
//!     "Size": [4, 1, 4],
//!     "Palette": { "minecraft:air": 0, "minecraft:stone": 1 },
//! });
//!
//! let doc = flatten_document("Schematic", &value, &schema).unwrap();
//! let bytes = nbtree::to_bytes(&doc).unwrap();
//!
//! let back = nbtree::from_bytes(&bytes).unwrap();
//! assert_eq!(back, doc);
//! ```
//!
//! # Byte layout
//!
//! Every named entry is a tag byte, a `u16` length-prefixed UTF-8 name and an
//! untagged payload. Payloads are big-endian. Strings use an *unsigned* 16 bit
//! length, byte arrays and lists a signed 32 bit count, int and long arrays an
//! unsigned 32 bit count. A compound is a run of named entries closed by a
//! single `End` byte, and a file is one named compound.

use std::convert::TryFrom;

pub mod canonical;
pub mod de;
pub mod error;
pub mod object;
pub mod schema;
pub mod ser;

mod value;

pub use de::{decode, from_bytes, from_bytes_with_opts, DeOpts};
pub use schema::Schema;
pub use ser::{encode, to_bytes, to_writer};
pub use value::*;

#[cfg(test)]
mod test;

/// An NBT tag. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "arbitrary1", derive(arbitrary::Arbitrary))]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other objects, all of the same tag.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
    /// Represents as array of Long (i64).
    LongArray = 12,
}

impl Tag {
    /// Size in bytes of the payload for tags with a fixed width. `None` for
    /// tags whose payload is length prefixed or terminated.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Tag::End => Some(0),
            Tag::Byte => Some(1),
            Tag::Short => Some(2),
            Tag::Int | Tag::Float => Some(4),
            Tag::Long | Tag::Double => Some(8),
            Tag::ByteArray
            | Tag::String
            | Tag::List
            | Tag::Compound
            | Tag::IntArray
            | Tag::LongArray => None,
        }
    }
}

// Crates exist to generate this code for us, but would add to our compile
// times, so we instead write it out manually. The tags will very rarely
// change.
impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::End => 0,
            Tag::Byte => 1,
            Tag::Short => 2,
            Tag::Int => 3,
            Tag::Long => 4,
            Tag::Float => 5,
            Tag::Double => 6,
            Tag::ByteArray => 7,
            Tag::String => 8,
            Tag::List => 9,
            Tag::Compound => 10,
            Tag::IntArray => 11,
            Tag::LongArray => 12,
        }
    }
}
