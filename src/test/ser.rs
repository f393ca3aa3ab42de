use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::error::{ErrorKind, Result};
use crate::ser::encoded_len;
use crate::{
    decode, encode, from_bytes, to_bytes, to_writer, Compound, Document, List, Tag, Value,
};

use super::builder::Builder;

fn single(name: &str, value: impl Into<Value>) -> Compound {
    let mut entries = Compound::new();
    entries.push(name, value);
    entries
}

#[test]
fn byte_scenario() -> Result<()> {
    assert_eq!(encode(&single("a", 42i8))?, [0x01, 0x00, 0x01, 0x61, 0x2A]);
    Ok(())
}

#[test]
fn four_byte_utf8_string_scenario() -> Result<()> {
    assert_eq!(
        encode(&single("a", "🔥"))?,
        [0x08, 0x00, 0x01, 0x61, 0x00, 0x04, 0xF0, 0x9F, 0x94, 0xA5]
    );
    Ok(())
}

#[test]
fn list_of_bytes_scenario() -> Result<()> {
    let list = List::of(vec![1i8.into(), 2i8.into(), 3i8.into(), 4i8.into()])?;
    assert_eq!(
        encode(&single("a", list))?,
        [0x09, 0x00, 0x01, 0x61, 0x01, 0x00, 0x00, 0x00, 0x04, 0x01, 0x02, 0x03, 0x04]
    );
    Ok(())
}

#[test]
fn empty_compound_scenario() -> Result<()> {
    assert_eq!(to_bytes(&Document::default())?, [0x0A, 0x00, 0x00, 0x00]);
    assert_eq!(
        encode(&single("", Compound::new()))?,
        [0x0A, 0x00, 0x00, 0x00]
    );
    Ok(())
}

#[test]
fn scalars_are_big_endian() -> Result<()> {
    let entries: Compound = vec![
        ("s".to_owned(), Value::Short(0x0102)),
        ("i".to_owned(), Value::Int(0x01020304)),
        ("l".to_owned(), Value::Long(0x0102030405060708)),
        ("f".to_owned(), Value::Float(1.0)),
        ("d".to_owned(), Value::Double(-2.0)),
    ]
    .into();

    let expected = Builder::new()
        .tag(Tag::Short)
        .name("s")
        .raw_bytes(&[1, 2])
        .tag(Tag::Int)
        .name("i")
        .raw_bytes(&[1, 2, 3, 4])
        .tag(Tag::Long)
        .name("l")
        .raw_bytes(&[1, 2, 3, 4, 5, 6, 7, 8])
        .tag(Tag::Float)
        .name("f")
        .raw_bytes(&[0x3F, 0x80, 0, 0])
        .tag(Tag::Double)
        .name("d")
        .raw_bytes(&[0xC0, 0, 0, 0, 0, 0, 0, 0])
        .build();

    assert_eq!(encode(&entries)?, expected);
    Ok(())
}

#[test]
fn round_trip_builder_document() -> Result<()> {
    let input = Builder::new()
        .start_compound("Level")
        .byte("b", -1)
        .short("s", i16::MIN)
        .int("i", i32::MAX)
        .long("l", i64::MIN)
        .float("f", f32::MAX)
        .double("d", f64::MIN_POSITIVE)
        .string("str", "hello, world")
        .byte_array("ba", &[i8::MIN, 0, i8::MAX])
        .int_array("ia", &[])
        .long_array("la", &[1, 2])
        .start_list("sections", Tag::Compound, 2)
        .start_anon_compound()
        .byte("Y", 0)
        .long_array("BlockStates", &[0x1111, 0x2222])
        .end_compound()
        .start_anon_compound()
        .byte("Y", 1)
        .end_compound()
        .start_list("strings", Tag::String, 2)
        .string_payload("a")
        .string_payload("")
        .start_compound("nested")
        .start_compound("deeper")
        .end_compound()
        .end_compound()
        .end_compound()
        .build();

    let doc = from_bytes(&input)?;
    let out = to_bytes(&doc)?;
    assert_eq!(out, input);
    assert_eq!(from_bytes(&out)?, doc);
    Ok(())
}

#[test]
fn decode_encode_is_identity_on_entries() -> Result<()> {
    let mut inner = Compound::new();
    inner.insert("x", 1.5f64);
    inner.insert("list", List::with_element(Tag::Int));

    let mut entries = Compound::new();
    entries.insert("name", "value");
    entries.insert("inner", inner);
    entries.insert("longs", vec![1i64, -1]);

    let bytes = encode(&entries)?;
    assert_eq!(decode(&bytes, 0)?, (entries, bytes.len()));
    Ok(())
}

#[test]
fn encoded_len_matches_output() -> Result<()> {
    let mut entries = Compound::new();
    entries.insert("a", List::of(vec![Value::from("x"), Value::from("yz")])?);
    entries.insert("b", Compound::new());
    entries.insert("c", vec![0i32; 10]);

    assert_eq!(encoded_len(&entries)?, encode(&entries)?.len());
    Ok(())
}

#[test]
fn list_of_end_with_items_fails() {
    let list = List {
        element: Tag::End,
        items: vec![Value::Int(1)],
    };

    let err = encode(&single("l", list)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidList);
}

#[test]
fn list_with_mixed_items_fails() {
    let list = List {
        element: Tag::Int,
        items: vec![Value::Int(1), Value::Short(2)],
    };

    let err = encode(&single("l", list)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidList);

    assert!(List::of(vec![Value::Int(1), Value::Short(2)]).is_err());
}

#[test]
fn list_push_checks_element() {
    let mut list = List::empty();
    list.push(1i32).unwrap();
    list.push(2i32).unwrap();
    assert_eq!(list.element, Tag::Int);
    assert!(list.push("three").is_err());
    assert_eq!(list.len(), 2);
}

#[test]
fn string_too_long_fails() {
    let long = "x".repeat(u16::MAX as usize + 1);
    let err = encode(&single("s", long.as_str())).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::LimitExceeded);

    let err = encode(&single(&long, 1i8)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::LimitExceeded);
}

#[test]
fn longest_string_round_trips() -> Result<()> {
    let long = "é".repeat(u16::MAX as usize / 2);
    let entries = single("s", long.as_str());
    let bytes = encode(&entries)?;

    assert_eq!(&bytes[4..6], &(long.len() as u16).to_be_bytes());
    assert_eq!(decode(&bytes, 0)?.0, entries);
    Ok(())
}

#[test]
fn to_writer_matches_to_bytes() -> Result<()> {
    let mut root = Compound::new();
    root.insert("DataVersion", 3465);
    root.insert("Name", "world");
    let doc = Document::new("Data", root);

    let mut out = vec![];
    to_writer(&mut out, &doc)?;
    assert_eq!(out, to_bytes(&doc)?);
    Ok(())
}

#[test]
fn to_writer_writes_nothing_on_error() {
    let mut root = Compound::new();
    root.insert("ok", 1i8);
    root.insert(
        "bad",
        List {
            element: Tag::Byte,
            items: vec![Value::Long(1)],
        },
    );
    let doc = Document::from(root);

    let mut out = vec![];
    assert!(to_writer(&mut out, &doc).is_err());
    assert!(out.is_empty());
}

#[test]
fn gzip_wrapped_round_trip() -> Result<()> {
    let mut root = Compound::new();
    root.insert("Palette", {
        let mut palette = Compound::new();
        palette.insert("minecraft:air", 0);
        palette.insert("minecraft:stone", 1);
        palette
    });
    root.insert("BlockData", vec![0i8, 1, 1, 0]);
    let doc = Document::new("Schematic", root);

    let mut encoder = GzEncoder::new(vec![], Compression::default());
    encoder.write_all(&to_bytes(&doc)?)?;
    let compressed = encoder.finish()?;

    let mut raw = vec![];
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut raw)?;

    assert_eq!(from_bytes(&raw)?, doc);
    Ok(())
}
