//! Encoding [`Value`] trees into NBT bytes.
//!
//! Encoding is done in two passes. The first walks the tree, checks that it
//! can be represented (string lengths, list element tags, array counts) and
//! sums the encoded size. The second writes into a buffer allocated once at
//! exactly that size. Nothing is written if the first pass fails.
//!
//! ```
//! use nbtree::{ser::encode, Compound};
//!
//! let mut entries = Compound::new();
//! entries.insert("a", 42i8);
//!
//! assert_eq!(encode(&entries).unwrap(), [0x01, 0x00, 0x01, b'a', 0x2A]);
//! ```
use std::convert::TryFrom;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use log::debug;

use crate::error::{Error, Result};
use crate::{Compound, Document, Tag, Value};

pub(crate) trait WriteNbt: Write {
    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_u8(u8::from(tag))?;
        Ok(())
    }

    fn write_size_prefixed_str(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| string_too_long(s.len()))?;
        self.write_u16::<BigEndian>(len)?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Unsigned 32 bit count, for int and long arrays.
    fn write_len(&mut self, len: usize) -> Result<()> {
        self.write_u32::<BigEndian>(
            u32::try_from(len).map_err(|_| Error::limit("len too large".to_owned()))?,
        )?;
        Ok(())
    }

    /// Signed 32 bit count, for lists and byte arrays.
    fn write_signed_len(&mut self, len: usize) -> Result<()> {
        self.write_i32::<BigEndian>(
            i32::try_from(len).map_err(|_| Error::limit("len too large".to_owned()))?,
        )?;
        Ok(())
    }
}

impl<T> WriteNbt for T where T: Write {}

fn string_too_long(len: usize) -> Error {
    Error::limit(format!(
        "string of {} bytes is longer than the maximum of {}",
        len,
        u16::MAX
    ))
}

/// Number of bytes [`encode`] will produce for `entries`, checking along the
/// way that everything in it can be encoded.
pub fn encoded_len(entries: &Compound) -> Result<usize> {
    entries.iter().try_fold(0, |acc, (name, value)| {
        Ok(acc + 1 + str_len(name)? + payload_len(value)?)
    })
}

fn document_len(doc: &Document) -> Result<usize> {
    Ok(1 + str_len(&doc.name)? + encoded_len(&doc.root)? + 1)
}

fn str_len(s: &str) -> Result<usize> {
    if s.len() > u16::MAX as usize {
        return Err(string_too_long(s.len()));
    }
    Ok(2 + s.len())
}

fn count_fits(len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(Error::limit(format!(
            "{} elements do not fit in a count of at most {}",
            len, max
        )));
    }
    Ok(())
}

fn payload_len(value: &Value) -> Result<usize> {
    Ok(match value {
        Value::Byte(_) => 1,
        Value::Short(_) => 2,
        Value::Int(_) | Value::Float(_) => 4,
        Value::Long(_) | Value::Double(_) => 8,
        Value::String(s) => str_len(s)?,
        Value::ByteArray(a) => {
            count_fits(a.len(), i32::MAX as usize)?;
            4 + a.len()
        }
        Value::IntArray(a) => {
            count_fits(a.len(), u32::MAX as usize)?;
            4 + 4 * a.len()
        }
        Value::LongArray(a) => {
            count_fits(a.len(), u32::MAX as usize)?;
            4 + 8 * a.len()
        }
        Value::List(l) => {
            l.check()?;
            count_fits(l.len(), i32::MAX as usize)?;
            l.iter()
                .try_fold(5, |acc, item| Ok::<_, Error>(acc + payload_len(item)?))?
        }
        Value::Compound(c) => encoded_len(c)? + 1,
    })
}

/// Encode a sequence of named entries. No `End` tag is written after them,
/// so this is the exact inverse of [`decode`][crate::de::decode] at the top
/// level. Nested compounds are closed with `End` as usual.
pub fn encode(entries: &Compound) -> Result<Vec<u8>> {
    let len = encoded_len(entries)?;
    let mut buf = vec![0u8; len];
    let mut out: &mut [u8] = &mut buf;
    write_entries(&mut out, entries)?;
    debug_assert!(out.is_empty(), "encoded length disagrees with bytes written");
    Ok(buf)
}

/// Encode a complete NBT file.
pub fn to_bytes(doc: &Document) -> Result<Vec<u8>> {
    let len = document_len(doc)?;
    let mut buf = vec![0u8; len];
    let mut out: &mut [u8] = &mut buf;
    write_document(&mut out, doc)?;
    debug_assert!(out.is_empty(), "encoded length disagrees with bytes written");

    debug!(
        "encoded document {:?}: {} root entries, {} bytes",
        doc.name,
        doc.root.len(),
        len
    );
    Ok(buf)
}

/// Encode a complete NBT file to a writer. The document is checked in full
/// before anything is written.
pub fn to_writer<W: Write>(mut writer: W, doc: &Document) -> Result<()> {
    let len = document_len(doc)?;
    write_document(&mut writer, doc)?;
    debug!("wrote document {:?}: {} bytes", doc.name, len);
    Ok(())
}

fn write_document<W: Write>(w: &mut W, doc: &Document) -> Result<()> {
    w.write_tag(Tag::Compound)?;
    w.write_size_prefixed_str(&doc.name)?;
    write_entries(w, &doc.root)?;
    w.write_tag(Tag::End)
}

fn write_entries<W: Write>(w: &mut W, entries: &Compound) -> Result<()> {
    for (name, value) in entries {
        w.write_tag(value.tag())?;
        w.write_size_prefixed_str(name)?;
        write_payload(w, value)?;
    }
    Ok(())
}

fn write_payload<W: Write>(w: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Byte(v) => w.write_i8(*v)?,
        Value::Short(v) => w.write_i16::<BigEndian>(*v)?,
        Value::Int(v) => w.write_i32::<BigEndian>(*v)?,
        Value::Long(v) => w.write_i64::<BigEndian>(*v)?,
        Value::Float(v) => w.write_f32::<BigEndian>(*v)?,
        Value::Double(v) => w.write_f64::<BigEndian>(*v)?,
        Value::String(s) => w.write_size_prefixed_str(s)?,
        Value::ByteArray(a) => {
            w.write_signed_len(a.len())?;
            for b in a {
                w.write_i8(*b)?;
            }
        }
        Value::IntArray(a) => {
            w.write_len(a.len())?;
            for i in a {
                w.write_i32::<BigEndian>(*i)?;
            }
        }
        Value::LongArray(a) => {
            w.write_len(a.len())?;
            for l in a {
                w.write_i64::<BigEndian>(*l)?;
            }
        }
        Value::List(l) => {
            w.write_tag(l.element)?;
            w.write_signed_len(l.len())?;
            for item in l.iter() {
                write_payload(w, item)?;
            }
        }
        Value::Compound(c) => {
            write_entries(w, c)?;
            w.write_tag(Tag::End)?;
        }
    }
    Ok(())
}
