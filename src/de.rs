//! Decoding NBT bytes into [`Value`] trees.
//!
//! The whole input is decoded eagerly. [`from_bytes`] expects a complete file,
//! which is a single named compound. [`decode`] is the lower level entry point:
//! it reads named entries from an offset until an `End` tag or the end of the
//! input, and reports where it stopped.
//!
//! ```
//! use nbtree::{de::decode, Value};
//!
//! // A byte called "a" with the value 42.
//! let input = [0x01, 0x00, 0x01, b'a', 0x2A];
//! let (entries, offset) = decode(&input, 0).unwrap();
//!
//! assert_eq!(entries["a"], Value::Byte(42));
//! assert_eq!(offset, input.len());
//! ```
//!
//! # Limits
//!
//! Counts in NBT are read from the input, so untrusted data can ask for huge
//! lists. Counts are checked against the remaining input before anything is
//! allocated, and [`DeOpts`] can lower the limits further.
use std::borrow::Cow;
use std::convert::TryFrom;

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::{Compound, Document, List, Tag, Value};

/// Options for customizing decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeOpts {
    pub(crate) max_seq_len: usize,
    pub(crate) max_depth: usize,
    pub(crate) modified_utf8: bool,
}

impl DeOpts {
    /// Create the default options.
    pub fn new() -> Self {
        Self {
            max_seq_len: usize::MAX,
            max_depth: 512,
            modified_utf8: true,
        }
    }

    /// Maximum number of elements a list or array can have. Defaults to no
    /// limit beyond what the input can actually hold.
    pub fn max_seq_len(mut self, value: usize) -> Self {
        self.max_seq_len = value;
        self
    }

    /// Maximum nesting of lists and compounds. Decoding recurses, so this
    /// bounds stack use. Defaults to 512.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }

    /// Whether strings that are not valid UTF-8 may be read as Java's
    /// modified UTF-8 (CESU-8), as written by the game itself for characters
    /// outside the basic multilingual plane. Defaults to true.
    pub fn modified_utf8(mut self, value: bool) -> Self {
        self.modified_utf8 = value;
        self
    }
}

impl Default for DeOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Read named entries from `buf` starting at `start`, stopping after an `End`
/// tag or at the end of `buf`. Returns the entries and the offset just past
/// what was read.
pub fn decode(buf: &[u8], start: usize) -> Result<(Compound, usize)> {
    decode_with_opts(buf, start, DeOpts::new())
}

/// [`decode`] with the given options.
pub fn decode_with_opts(buf: &[u8], start: usize, opts: DeOpts) -> Result<(Compound, usize)> {
    let input = buf.get(start..).ok_or_else(Error::unexpected_eof)?;
    let mut reader = Reader::new(input, opts);
    let entries = reader.read_entries(true)?;
    let offset = buf.len() - reader.input.len();

    trace!("decoded {} entries from {}..{}", entries.len(), start, offset);
    Ok((entries, offset))
}

/// Decode a complete NBT file: a single named compound and nothing after it.
pub fn from_bytes(buf: &[u8]) -> Result<Document> {
    from_bytes_with_opts(buf, DeOpts::new())
}

/// [`from_bytes`] with the given options.
pub fn from_bytes_with_opts(buf: &[u8], opts: DeOpts) -> Result<Document> {
    let mut reader = Reader::new(buf, opts);
    if reader.input.is_empty() {
        return Err(Error::no_root_compound());
    }

    if reader.consume_tag()? != Tag::Compound {
        return Err(Error::no_root_compound());
    }

    let name = reader.consume_str()?;
    let root = reader.read_compound()?;

    if !reader.input.is_empty() {
        return Err(Error::bespoke(format!(
            "invalid nbt: {} trailing bytes after root compound",
            reader.input.len()
        )));
    }

    debug!(
        "decoded document {:?}: {} bytes, {} root entries",
        name,
        buf.len(),
        root.len()
    );
    Ok(Document { name, root })
}

/// Smallest number of bytes an untagged payload of `tag` can take. Used to
/// reject counts that the remaining input could never satisfy.
fn min_payload_size(tag: Tag) -> usize {
    match tag.fixed_size() {
        Some(size) => size,
        None => match tag {
            Tag::String => 2,
            Tag::List => 5,
            Tag::Compound => 1,
            _ => 4,
        },
    }
}

struct Reader<'de> {
    input: &'de [u8],
    opts: DeOpts,
    depth: usize,
}

impl<'de> Reader<'de> {
    fn new(input: &'de [u8], opts: DeOpts) -> Self {
        Self {
            input,
            opts,
            depth: 0,
        }
    }

    fn consume(&mut self, n: usize) -> Result<&'de [u8]> {
        if n <= self.input.len() {
            let (ret, rest) = self.input.split_at(n);
            self.input = rest;
            Ok(ret)
        } else {
            Err(Error::unexpected_eof())
        }
    }

    fn consume_tag(&mut self) -> Result<Tag> {
        let tag = self.consume(1)?[0];
        Tag::try_from(tag).map_err(|_| Error::invalid_tag(tag))
    }

    fn consume_str(&mut self) -> Result<String> {
        let len = self.consume(2)?.read_u16::<BigEndian>()? as usize;
        let bs = self.consume(len)?;

        match std::str::from_utf8(bs) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) if self.opts.modified_utf8 => cesu8::from_java_cesu8(bs)
                .map(Cow::into_owned)
                .map_err(|_| Error::nonunicode_string(bs)),
            Err(_) => Err(Error::nonunicode_string(bs)),
        }
    }

    /// Signed 32 bit count, used by lists and byte arrays.
    fn consume_count(&mut self) -> Result<usize> {
        let count = self.consume(4)?.read_i32::<BigEndian>()?;
        usize::try_from(count)
            .map_err(|_| Error::bespoke(format!("invalid nbt: negative length {}", count)))
    }

    /// Unsigned 32 bit count, used by int and long arrays.
    fn consume_ucount(&mut self) -> Result<usize> {
        let count = self.consume(4)?.read_u32::<BigEndian>()?;
        usize::try_from(count).map_err(|_| Error::limit(format!("length {} too large", count)))
    }

    /// Check `len` elements of at least `width` bytes each could be present.
    fn check_len(&self, len: usize, width: usize) -> Result<()> {
        if len > self.opts.max_seq_len {
            return Err(Error::limit(format!(
                "size ({}) greater than max sequence length ({})",
                len, self.opts.max_seq_len,
            )));
        }

        match len.checked_mul(width) {
            Some(bytes) if bytes <= self.input.len() => Ok(()),
            _ => Err(Error::unexpected_eof()),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.opts.max_depth {
            return Err(Error::limit(format!(
                "nesting deeper than max depth ({})",
                self.opts.max_depth
            )));
        }
        Ok(())
    }

    /// Read named entries until an `End` tag. At the top level running out of
    /// input between entries also ends the sequence.
    fn read_entries(&mut self, top_level: bool) -> Result<Compound> {
        let mut compound = Compound::new();
        loop {
            if top_level && self.input.is_empty() {
                break;
            }

            let tag = self.consume_tag()?;
            if tag == Tag::End {
                break;
            }

            let name = self.consume_str()?;
            let value = self.read_payload(tag)?;
            compound.entries.push((name, value));
        }
        Ok(compound)
    }

    fn read_compound(&mut self) -> Result<Compound> {
        self.enter()?;
        let compound = self.read_entries(false)?;
        self.depth -= 1;
        Ok(compound)
    }

    fn read_payload(&mut self, tag: Tag) -> Result<Value> {
        Ok(match tag {
            Tag::Byte => Value::Byte(self.consume(1)?.read_i8()?),
            Tag::Short => Value::Short(self.consume(2)?.read_i16::<BigEndian>()?),
            Tag::Int => Value::Int(self.consume(4)?.read_i32::<BigEndian>()?),
            Tag::Long => Value::Long(self.consume(8)?.read_i64::<BigEndian>()?),
            Tag::Float => Value::Float(self.consume(4)?.read_f32::<BigEndian>()?),
            Tag::Double => Value::Double(self.consume(8)?.read_f64::<BigEndian>()?),
            Tag::String => Value::String(self.consume_str()?),
            Tag::ByteArray => {
                let len = self.consume_count()?;
                self.check_len(len, 1)?;
                let bs = self.consume(len)?;
                Value::ByteArray(bs.iter().map(|&b| b as i8).collect())
            }
            Tag::IntArray => {
                let len = self.consume_ucount()?;
                self.check_len(len, 4)?;
                let mut bs = self.consume(len * 4)?;
                let mut data = vec![0i32; len];
                bs.read_i32_into::<BigEndian>(&mut data)?;
                Value::IntArray(data)
            }
            Tag::LongArray => {
                let len = self.consume_ucount()?;
                self.check_len(len, 8)?;
                let mut bs = self.consume(len * 8)?;
                let mut data = vec![0i64; len];
                bs.read_i64_into::<BigEndian>(&mut data)?;
                Value::LongArray(data)
            }
            Tag::List => {
                self.enter()?;
                let element = self.consume_tag()?;
                let len = self.consume_count()?;

                // End has no payload, so a long 'list of end' would be a tiny
                // input claiming lots of elements. Empty ones are what the
                // format uses for an untyped empty list, so they are fine.
                if element == Tag::End && len != 0 {
                    return Err(Error::invalid_list(format!(
                        "unexpected list of type 'end' with {} elements",
                        len
                    )));
                }

                self.check_len(len, min_payload_size(element))?;
                trace!("list of {} {:?} at depth {}", len, element, self.depth);

                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_payload(element)?);
                }
                self.depth -= 1;
                Value::List(List { element, items })
            }
            Tag::Compound => Value::Compound(self.read_compound()?),
            Tag::End => return Err(Error::unexpected_end()),
        })
    }
}
