//! script.dat decoding.
//!
//! Layout: a version header, a u32 mod count, then per mod a packed name, a
//! packed byte length, that many bytes of mod data and one legacy flag byte.
//! Each mod's data is its own sub-stream: a nested version header followed
//! by exactly one saved Lua value, with gcids numbered from 0.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::codec::lua_object::decode_lua_object;
use crate::codec::primitives::Reader;
use crate::codec::version::decode_version;
use crate::error::DecodeError;
use crate::limits::{MAX_MOD_COUNT, MAX_NESTING_DEPTH, MAX_STRING_LEN, MAX_TABLE_ENTRIES};
use crate::model::{
    GcId, GcObject, LuaTable, MapVersion, ModState, SavedLuaValue, SavedLuaValueType, ScriptDat,
};

/// Options for decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Require every nested header to equal the document header, and the
    /// settings header branch byte to be zero.
    pub strict_version: bool,

    /// Maximum table / PropertyTree nesting depth.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_version: false,
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Creates default (lenient) decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject version header mismatches.
    pub fn strict() -> Self {
        Self {
            strict_version: true,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Decodes a script.dat document with default options.
pub fn decode_script_dat(input: &[u8]) -> Result<ScriptDat, DecodeError> {
    decode_script_dat_with_options(input, DecodeOptions::default())
}

/// Decodes a script.dat document.
pub fn decode_script_dat_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<ScriptDat, DecodeError> {
    let mut reader = Reader::new(input);
    let version = decode_version(&mut reader)?;

    let mod_count = reader.read_u32("mod count")? as usize;
    if mod_count > MAX_MOD_COUNT {
        return Err(DecodeError::LengthExceedsLimit {
            field: "mods",
            len: mod_count,
            max: MAX_MOD_COUNT,
        });
    }

    let mut mods = Vec::with_capacity(mod_count.min(reader.remaining_len()));
    let mut seen = FxHashSet::with_capacity_and_hasher(mods.capacity(), Default::default());
    for _ in 0..mod_count {
        let name = reader.read_packed_string(MAX_STRING_LEN, "mod name")?;
        if !seen.insert(name.clone()) {
            return Err(DecodeError::DuplicateMod { name });
        }
        let len = reader.read_packed_u8_32("mod data length")? as usize;
        let mut sub = reader.sub_reader(len, "mod data")?;
        mods.push(decode_mod(&mut sub, name, &version, &options)?);
        reader.read_u8("mod legacy flag")?;
    }

    if !reader.is_empty() {
        log::warn!(
            "{} bytes after the last mod at offset {} were not decoded",
            reader.remaining_len(),
            reader.absolute_position()
        );
    }

    Ok(ScriptDat::new(version, mods))
}

/// Decodes one mod's sub-stream into its root value and gcid arena.
fn decode_mod(
    reader: &mut Reader<'_>,
    name: String,
    version: &MapVersion,
    options: &DecodeOptions,
) -> Result<ModState, DecodeError> {
    let nested = decode_version(reader)?;
    if options.strict_version && nested != *version {
        return Err(DecodeError::VersionMismatch {
            expected: *version,
            found: nested,
        });
    }

    let mut session = ModSession::new(options.max_depth);
    let root = session.decode_value(reader, 0)?;
    reader.expect_end("mod data")?;

    let objects = session.finish();
    log::debug!(
        "decoded mod {name:?}: {} bytes, {} objects",
        reader.position(),
        objects.len()
    );
    Ok(ModState::new(name, root, objects))
}

/// Per-mod decode state: the gcid counter and back-reference arena.
///
/// A slot is `None` from allocation until its table or object is complete,
/// so a reference to it from inside its own subtree is rejected.
struct ModSession {
    slots: Vec<Option<GcObject>>,
    max_depth: usize,
}

impl ModSession {
    fn new(max_depth: usize) -> Self {
        Self {
            slots: Vec::new(),
            max_depth,
        }
    }

    fn next_gcid(&self) -> u32 {
        self.slots.len() as u32
    }

    fn allocate(&mut self) -> GcId {
        let id = GcId(self.next_gcid());
        self.slots.push(None);
        id
    }

    fn complete(&mut self, object: GcObject) {
        let slot = object.gcid().index();
        self.slots[slot] = Some(object);
    }

    fn finish(self) -> Vec<GcObject> {
        self.slots.into_iter().flatten().collect()
    }

    fn decode_value(
        &mut self,
        reader: &mut Reader<'_>,
        depth: usize,
    ) -> Result<SavedLuaValue, DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                max: self.max_depth,
            });
        }

        let position = reader.absolute_position();
        let tag = reader.read_u8("saved value type")?;
        let value_type = SavedLuaValueType::from_u8(tag).ok_or(DecodeError::UnknownTag {
            context: "saved lua value",
            tag,
            position,
        })?;

        match value_type {
            SavedLuaValueType::Nil => Ok(SavedLuaValue::Nil),
            SavedLuaValueType::BoolFalse => Ok(SavedLuaValue::Bool(false)),
            SavedLuaValueType::BoolTrue => Ok(SavedLuaValue::Bool(true)),
            SavedLuaValueType::Number => Ok(SavedLuaValue::Number(reader.read_f64("number")?)),
            SavedLuaValueType::String => Ok(SavedLuaValue::String(
                reader.read_packed_string(MAX_STRING_LEN, "string")?,
            )),
            SavedLuaValueType::Table => self.decode_table(reader, false, depth),
            SavedLuaValueType::TableWithMeta => self.decode_table(reader, true, depth),
            SavedLuaValueType::ExistingGCObject => self.decode_reference(reader),
            SavedLuaValueType::LuaObject => {
                let gcid = self.allocate();
                let object = Arc::new(decode_lua_object(reader, gcid)?);
                self.complete(GcObject::LuaObject(Arc::clone(&object)));
                Ok(SavedLuaValue::LuaObject(object))
            }
        }
    }

    fn decode_table(
        &mut self,
        reader: &mut Reader<'_>,
        with_meta: bool,
        depth: usize,
    ) -> Result<SavedLuaValue, DecodeError> {
        let gcid = self.allocate();
        let metatable = if with_meta {
            Some(reader.read_packed_string(MAX_STRING_LEN, "metatable name")?)
        } else {
            None
        };

        let count = reader.read_packed_u8_32("table entry count")? as usize;
        if count > MAX_TABLE_ENTRIES {
            return Err(DecodeError::LengthExceedsLimit {
                field: "table entries",
                len: count,
                max: MAX_TABLE_ENTRIES,
            });
        }

        // each pair is at least two tag bytes
        let mut entries = Vec::with_capacity(count.min(reader.remaining_len() / 2));
        for _ in 0..count {
            let key = self.decode_value(reader, depth + 1)?;
            let value = self.decode_value(reader, depth + 1)?;
            entries.push((key, value));
        }

        let table = Arc::new(LuaTable {
            gcid,
            metatable,
            entries,
        });
        self.complete(GcObject::Table(Arc::clone(&table)));
        Ok(SavedLuaValue::Table(table))
    }

    fn decode_reference(&mut self, reader: &mut Reader<'_>) -> Result<SavedLuaValue, DecodeError> {
        let id = reader.read_packed_u16_32("gc object id")?;
        match self.slots.get(id as usize) {
            Some(Some(_)) => Ok(SavedLuaValue::ExistingGCObjectRef(GcId(id))),
            _ => Err(DecodeError::InvalidReference {
                id,
                next_gcid: self.next_gcid(),
            }),
        }
    }
}
