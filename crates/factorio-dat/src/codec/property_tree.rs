//! PropertyTree encoding/decoding.
//!
//! Every value is a type tag byte, a reserved byte (written as 0, ignored on
//! read) and a payload. Strings use the "short string" form: an empty-flag
//! byte, then a packed (8→32) length and UTF-8 bytes when non-empty.

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_COLLECTION_LEN, MAX_NESTING_DEPTH, MAX_STRING_LEN};
use crate::model::{PropertyDict, PropertyTree, PropertyTreeType};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a standalone PropertyTree blob. The whole input must be consumed.
pub fn decode_property_tree(input: &[u8]) -> Result<PropertyTree, DecodeError> {
    let mut reader = Reader::new(input);
    let tree = read_property_tree(&mut reader, MAX_NESTING_DEPTH)?;
    reader.expect_end("property tree")?;
    Ok(tree)
}

/// Reads one PropertyTree value from the reader.
pub fn read_property_tree(
    reader: &mut Reader<'_>,
    max_depth: usize,
) -> Result<PropertyTree, DecodeError> {
    decode_node(reader, 0, max_depth)
}

fn decode_node(
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<PropertyTree, DecodeError> {
    if depth > max_depth {
        return Err(DecodeError::DepthLimitExceeded { max: max_depth });
    }

    let position = reader.absolute_position();
    let tag = reader.read_u8("property tree type")?;
    reader.read_u8("property tree reserved")?;
    let tree_type = PropertyTreeType::from_u8(tag).ok_or(DecodeError::UnknownTag {
        context: "property tree",
        tag,
        position,
    })?;

    match tree_type {
        PropertyTreeType::None => Ok(PropertyTree::None),
        PropertyTreeType::Bool => Ok(PropertyTree::Bool(reader.read_u8("bool")? != 0)),
        PropertyTreeType::Number => Ok(PropertyTree::Number(reader.read_f64("number")?)),
        PropertyTreeType::String => Ok(PropertyTree::String(read_short_string(reader, "string")?)),
        PropertyTreeType::List => decode_list(reader, depth, max_depth),
        PropertyTreeType::Dictionary => decode_dict(reader, depth, max_depth),
        PropertyTreeType::SignedInteger => {
            Ok(PropertyTree::SignedInteger(reader.read_i64("signed integer")?))
        }
        PropertyTreeType::UnsignedInteger => {
            Ok(PropertyTree::UnsignedInteger(reader.read_u64("unsigned integer")?))
        }
    }
}

fn read_count(reader: &mut Reader<'_>, field: &'static str) -> Result<usize, DecodeError> {
    let count = reader.read_u32(field)? as usize;
    if count > MAX_COLLECTION_LEN {
        return Err(DecodeError::LengthExceedsLimit {
            field,
            len: count,
            max: MAX_COLLECTION_LEN,
        });
    }
    Ok(count)
}

fn decode_list(
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<PropertyTree, DecodeError> {
    let count = read_count(reader, "list count")?;
    // each element is at least an empty key flag and a two-byte value
    let mut items = Vec::with_capacity(count.min(reader.remaining_len() / 3));
    for _ in 0..count {
        let key = read_short_string(reader, "list key")?;
        if !key.is_empty() {
            log::debug!("discarding non-empty list key {key:?}");
        }
        items.push(decode_node(reader, depth + 1, max_depth)?);
    }
    Ok(PropertyTree::List(items))
}

fn decode_dict(
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<PropertyTree, DecodeError> {
    let count = read_count(reader, "dictionary count")?;
    // each entry is at least a one-byte key and a two-byte value
    let mut dict = PropertyDict::with_capacity(count.min(reader.remaining_len() / 5));
    for _ in 0..count {
        let position = reader.absolute_position();
        let key = read_short_string(reader, "dictionary key")?;
        if key.is_empty() {
            return Err(DecodeError::MalformedKey { position });
        }
        let value = decode_node(reader, depth + 1, max_depth)?;
        dict.insert(key, value);
    }
    Ok(PropertyTree::Dict(dict))
}

/// Reads a short string: empty flag, then packed length and bytes.
pub fn read_short_string(reader: &mut Reader<'_>, field: &'static str) -> Result<String, DecodeError> {
    if reader.read_u8(field)? != 0 {
        return Ok(String::new());
    }
    reader.read_packed_string(MAX_STRING_LEN, field)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a PropertyTree to bytes.
pub fn encode_property_tree(tree: &PropertyTree) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    write_property_tree(&mut writer, tree)?;
    Ok(writer.into_bytes())
}

/// Writes one PropertyTree value.
pub fn write_property_tree(writer: &mut Writer, tree: &PropertyTree) -> Result<(), EncodeError> {
    encode_node(writer, tree, 0)
}

fn encode_node(writer: &mut Writer, tree: &PropertyTree, depth: usize) -> Result<(), EncodeError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(EncodeError::DepthLimitExceeded {
            max: MAX_NESTING_DEPTH,
        });
    }

    writer.write_u8(tree.tree_type() as u8);
    writer.write_u8(0);

    match tree {
        PropertyTree::None => {}
        PropertyTree::Bool(b) => writer.write_u8(*b as u8),
        PropertyTree::Number(n) => writer.write_f64(*n),
        PropertyTree::String(s) => write_short_string(writer, s, "string")?,
        PropertyTree::List(items) => {
            write_count(writer, items.len(), "list")?;
            for item in items {
                write_short_string(writer, "", "list key")?;
                encode_node(writer, item, depth + 1)?;
            }
        }
        PropertyTree::Dict(dict) => {
            write_count(writer, dict.len(), "dictionary")?;
            for (key, value) in dict.iter() {
                if key.is_empty() {
                    return Err(EncodeError::EmptyKey);
                }
                write_short_string(writer, key, "dictionary key")?;
                encode_node(writer, value, depth + 1)?;
            }
        }
        PropertyTree::SignedInteger(n) => writer.write_i64(*n),
        PropertyTree::UnsignedInteger(n) => writer.write_u64(*n),
    }
    Ok(())
}

fn write_count(writer: &mut Writer, len: usize, field: &'static str) -> Result<(), EncodeError> {
    if len > MAX_COLLECTION_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field,
            len,
            max: MAX_COLLECTION_LEN,
        });
    }
    writer.write_u32(len as u32);
    Ok(())
}

/// Writes a short string; the empty string is just the set empty flag.
pub fn write_short_string(writer: &mut Writer, s: &str, field: &'static str) -> Result<(), EncodeError> {
    if s.is_empty() {
        writer.write_u8(1);
        return Ok(());
    }
    if s.len() > MAX_STRING_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field,
            len: s.len(),
            max: MAX_STRING_LEN,
        });
    }
    writer.write_u8(0);
    writer.write_packed_string(s);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_number_wire_shape() {
        let bytes = encode_property_tree(&PropertyTree::Number(3.5)).unwrap();
        let mut expected = vec![2u8, 0];
        expected.extend_from_slice(&3.5f64.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_string_wire_shape() {
        assert_eq!(
            encode_property_tree(&PropertyTree::from("hi")).unwrap(),
            vec![3, 0, 0, 2, b'h', b'i']
        );
        assert_eq!(encode_property_tree(&PropertyTree::from("")).unwrap(), vec![3, 0, 1]);

        let long = "a".repeat(300);
        let bytes = encode_property_tree(&PropertyTree::from(long.as_str())).unwrap();
        assert_eq!(&bytes[..8], &[3, 0, 0, 0xFF, 0x2C, 0x01, 0x00, 0x00]);
        assert_eq!(bytes.len(), 8 + 300);
    }

    #[test]
    fn test_redundant_long_length_decodes() {
        let bytes = [3, 0, 0, 0xFF, 2, 0, 0, 0, b'h', b'i'];
        assert_eq!(decode_property_tree(&bytes).unwrap(), PropertyTree::from("hi"));
    }

    #[test]
    fn test_reserved_byte_ignored() {
        assert_eq!(decode_property_tree(&[1, 0x7F, 5]).unwrap(), PropertyTree::Bool(true));
        assert_eq!(decode_property_tree(&[1, 0, 0]).unwrap(), PropertyTree::Bool(false));
    }

    #[test]
    fn test_list_layout() {
        let list = PropertyTree::List(vec![PropertyTree::None, PropertyTree::Bool(true)]);
        let bytes = encode_property_tree(&list).unwrap();
        assert_eq!(bytes, vec![4, 0, 2, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1]);
        assert_eq!(decode_property_tree(&bytes).unwrap(), list);
    }

    #[test]
    fn test_list_key_slot_discarded() {
        // one element whose key slot is "k"
        let bytes = [4, 0, 1, 0, 0, 0, 0, 1, b'k', 0, 0];
        assert_eq!(
            decode_property_tree(&bytes).unwrap(),
            PropertyTree::List(vec![PropertyTree::None])
        );
    }

    #[test]
    fn test_dict_empty_key_flag_rejected() {
        let bytes = [5, 0, 1, 0, 0, 0, 1, 0, 0];
        assert_eq!(
            decode_property_tree(&bytes).unwrap_err(),
            DecodeError::MalformedKey { position: 6 }
        );
    }

    #[test]
    fn test_dict_zero_length_key_rejected() {
        let bytes = [5, 0, 1, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            decode_property_tree(&bytes),
            Err(DecodeError::MalformedKey { .. })
        ));
    }

    #[test]
    fn test_dict_duplicate_keys_overwrite() {
        let bytes = [
            5, 0, 2, 0, 0, 0, //
            0, 1, b'a', 1, 0, 0, //
            0, 1, b'a', 1, 0, 1,
        ];
        let tree = decode_property_tree(&bytes).unwrap();
        let dict = tree.as_dict().unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("a"), Some(&PropertyTree::Bool(true)));
    }

    #[test]
    fn test_encode_rejects_empty_key() {
        let dict: PropertyDict = [("", PropertyTree::None)].into_iter().collect();
        assert_eq!(
            encode_property_tree(&PropertyTree::Dict(dict)),
            Err(EncodeError::EmptyKey)
        );
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            decode_property_tree(&[9, 0]).unwrap_err(),
            DecodeError::UnknownTag {
                context: "property tree",
                tag: 9,
                position: 0
            }
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(matches!(
            decode_property_tree(&[0, 0, 0]),
            Err(DecodeError::UnconsumedTrailingData { remaining: 1, .. })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        assert!(matches!(
            decode_property_tree(&[2, 0, 1, 2, 3]),
            Err(DecodeError::OutOfRange { context: "number", .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut writer = Writer::new();
        for _ in 0..4 {
            writer.write_bytes(&[4, 0, 1, 0, 0, 0, 1]);
        }
        writer.write_bytes(&[0, 0]);
        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(
            read_property_tree(&mut reader, 3).unwrap_err(),
            DecodeError::DepthLimitExceeded { max: 3 }
        );
        assert!(decode_property_tree(writer.as_bytes()).is_ok());
    }

    #[test]
    fn test_oversized_counts_fail_without_reserving() {
        // a chain of containers each declaring the maximum element count
        let mut writer = Writer::new();
        for i in 0..64 {
            let tag = if i % 2 == 0 { 4 } else { 5 };
            writer.write_bytes(&[tag, 0]);
            writer.write_u32(MAX_COLLECTION_LEN as u32);
            if tag == 4 {
                writer.write_u8(1);
            } else {
                writer.write_bytes(&[0, 1, b'k']);
            }
        }
        assert!(matches!(
            decode_property_tree(writer.as_bytes()),
            Err(DecodeError::OutOfRange { .. })
        ));

        let mut writer = Writer::new();
        writer.write_bytes(&[4, 0]);
        writer.write_u32(MAX_COLLECTION_LEN as u32 + 1);
        assert!(matches!(
            decode_property_tree(writer.as_bytes()),
            Err(DecodeError::LengthExceedsLimit { field: "list count", .. })
        ));
    }

    #[test]
    fn test_integer_variants_roundtrip() {
        for tree in [PropertyTree::SignedInteger(-42), PropertyTree::UnsignedInteger(u64::MAX)] {
            let bytes = encode_property_tree(&tree).unwrap();
            assert_eq!(bytes.len(), 10);
            assert_eq!(decode_property_tree(&bytes).unwrap(), tree);
        }
    }

    fn arb_tree() -> impl Strategy<Value = PropertyTree> {
        let leaf = prop_oneof![
            Just(PropertyTree::None),
            any::<bool>().prop_map(PropertyTree::Bool),
            any::<f64>()
                .prop_filter("NaN never compares equal", |n| !n.is_nan())
                .prop_map(PropertyTree::Number),
            ".*".prop_map(PropertyTree::String),
            any::<i64>().prop_map(PropertyTree::SignedInteger),
            any::<u64>().prop_map(PropertyTree::UnsignedInteger),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(PropertyTree::List),
                prop::collection::vec((".+", inner), 0..8)
                    .prop_map(|entries| PropertyTree::Dict(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_roundtrip_law(tree in arb_tree()) {
            let bytes = encode_property_tree(&tree).unwrap();
            prop_assert_eq!(decode_property_tree(&bytes).unwrap(), tree);
        }
    }
}
