//! LuaObject payload decoding.
//!
//! The payload layout is looked up from the type code and walked field by
//! field; nothing in the payload is self-describing.

use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::MAX_STRING_LEN;
use crate::model::{
    ChunkPosition, FieldKind, FieldSpec, FieldValue, GcId, LuaObject, LuaObjectType, MapPosition,
    TilePosition,
};

/// Decodes a type code and its payload. `gcid` must already be allocated.
pub fn decode_lua_object(reader: &mut Reader<'_>, gcid: GcId) -> Result<LuaObject, DecodeError> {
    let position = reader.absolute_position();
    let type_code = reader.read_u32("lua object type")?;
    let object_type = LuaObjectType::from_u32(type_code)
        .ok_or(DecodeError::UnknownLuaObjectType { type_code, position })?;

    if !object_type.is_persistable() {
        return Err(DecodeError::UnsupportedPersistedType {
            type_name: object_type.name(),
            type_code,
        });
    }

    let layout = object_type.layout();
    let mut fields = Vec::with_capacity(layout.len());
    for spec in layout {
        fields.push((spec.name, decode_field(reader, spec)?));
    }

    log::trace!("{gcid} = {object_type} at offset {position}");
    Ok(LuaObject {
        gcid,
        object_type,
        fields,
    })
}

fn decode_field(reader: &mut Reader<'_>, spec: &FieldSpec) -> Result<FieldValue, DecodeError> {
    let name = spec.name;
    Ok(match spec.kind {
        FieldKind::U8 => FieldValue::U8(reader.read_u8(name)?),
        FieldKind::U16 => FieldValue::U16(reader.read_u16(name)?),
        FieldKind::U32 => FieldValue::U32(reader.read_u32(name)?),
        FieldKind::U64 => FieldValue::U64(reader.read_u64(name)?),
        FieldKind::MapPosition => FieldValue::MapPosition(MapPosition {
            x: reader.read_i32(name)?,
            y: reader.read_i32(name)?,
        }),
        FieldKind::ChunkPosition => FieldValue::ChunkPosition(ChunkPosition {
            x: reader.read_i32(name)?,
            y: reader.read_i32(name)?,
        }),
        FieldKind::TilePosition => FieldValue::TilePosition(TilePosition {
            x: reader.read_i32(name)?,
            y: reader.read_i32(name)?,
        }),
        FieldKind::Str => FieldValue::Str(reader.read_packed_string(MAX_STRING_LEN, name)?),
    })
}

/// Writes a type code and payload fields the way the game lays them out.
#[cfg(test)]
pub(crate) fn write_lua_object(
    writer: &mut crate::codec::primitives::Writer,
    object_type: LuaObjectType,
    fields: &[FieldValue],
) {
    writer.write_u32(object_type as u32);
    for field in fields {
        match field {
            FieldValue::U8(v) => writer.write_u8(*v),
            FieldValue::U16(v) => writer.write_u16(*v),
            FieldValue::U32(v) => writer.write_u32(*v),
            FieldValue::U64(v) => writer.write_u64(*v),
            FieldValue::MapPosition(MapPosition { x, y })
            | FieldValue::ChunkPosition(ChunkPosition { x, y })
            | FieldValue::TilePosition(TilePosition { x, y }) => {
                writer.write_i32(*x);
                writer.write_i32(*y);
            }
            FieldValue::Str(s) => writer.write_packed_string(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::primitives::Writer;

    #[test]
    fn test_entity_payload() {
        let mut writer = Writer::new();
        write_lua_object(
            &mut writer,
            LuaObjectType::LuaEntity,
            &[
                FieldValue::U32(1),
                FieldValue::MapPosition(MapPosition { x: 512, y: -256 }),
                FieldValue::U64(77),
            ],
        );
        let mut reader = Reader::new(writer.as_bytes());
        let object = decode_lua_object(&mut reader, GcId(4)).unwrap();

        assert!(reader.is_empty());
        assert_eq!(object.gcid, GcId(4));
        assert_eq!(object.object_type, LuaObjectType::LuaEntity);
        assert_eq!(object.field("entity_id").and_then(FieldValue::as_u64), Some(77));
        assert_eq!(
            object.field("position"),
            Some(&FieldValue::MapPosition(MapPosition { x: 512, y: -256 }))
        );
    }

    #[test]
    fn test_string_payload() {
        let mut writer = Writer::new();
        write_lua_object(
            &mut writer,
            LuaObjectType::LuaTechnology,
            &[FieldValue::U8(1), FieldValue::Str("automation".into())],
        );
        let mut reader = Reader::new(writer.as_bytes());
        let object = decode_lua_object(&mut reader, GcId(0)).unwrap();
        assert_eq!(object.field("name").and_then(FieldValue::as_str), Some("automation"));
    }

    #[test]
    fn test_every_persistable_layout_consumes_exactly_its_fields() {
        for ty in LuaObjectType::ALL.iter().filter(|ty| ty.is_persistable()) {
            let fields: Vec<_> = ty
                .layout()
                .iter()
                .map(|spec| match spec.kind {
                    FieldKind::U8 => FieldValue::U8(1),
                    FieldKind::U16 => FieldValue::U16(2),
                    FieldKind::U32 => FieldValue::U32(3),
                    FieldKind::U64 => FieldValue::U64(4),
                    FieldKind::MapPosition => FieldValue::MapPosition(MapPosition { x: 5, y: 6 }),
                    FieldKind::ChunkPosition => {
                        FieldValue::ChunkPosition(ChunkPosition { x: 7, y: 8 })
                    }
                    FieldKind::TilePosition => FieldValue::TilePosition(TilePosition { x: 9, y: 10 }),
                    FieldKind::Str => FieldValue::Str("x".into()),
                })
                .collect();
            let mut writer = Writer::new();
            write_lua_object(&mut writer, *ty, &fields);
            writer.write_u8(0xEE);

            let mut reader = Reader::new(writer.as_bytes());
            let object = decode_lua_object(&mut reader, GcId(0)).unwrap();
            let decoded: Vec<_> = object.fields.into_iter().map(|(_, v)| v).collect();
            assert_eq!(decoded, fields, "{ty}");
            assert_eq!(reader.remaining(), &[0xEE], "{ty}");
        }
    }

    #[test]
    fn test_unknown_type_code() {
        let mut reader = Reader::new(&[0x0F, 0x27, 0, 0, 1, 2, 3]);
        assert_eq!(
            decode_lua_object(&mut reader, GcId(0)).unwrap_err(),
            DecodeError::UnknownLuaObjectType {
                type_code: 9999,
                position: 0
            }
        );
    }

    #[test]
    fn test_non_persistable_type() {
        let mut writer = Writer::new();
        writer.write_u32(LuaObjectType::LuaGameScript as u32);
        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(
            decode_lua_object(&mut reader, GcId(0)).unwrap_err(),
            DecodeError::UnsupportedPersistedType {
                type_name: "LuaGameScript",
                type_code: 36
            }
        );
    }

    #[test]
    fn test_truncated_payload() {
        let mut writer = Writer::new();
        writer.write_u32(LuaObjectType::LuaPlayer as u32);
        writer.write_u8(1);
        let mut reader = Reader::new(writer.as_bytes());
        assert!(matches!(
            decode_lua_object(&mut reader, GcId(0)),
            Err(DecodeError::OutOfRange { context: "player_index", .. })
        ));
    }
}
