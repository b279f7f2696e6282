//! Decoded script.dat value graph.

use std::fmt;
use std::sync::Arc;

use crate::model::LuaObject;

/// Per-mod object identifier, issued sequentially from 0 as tables and
/// LuaObjects are first decoded. Meaningless outside its own mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GcId(pub u32);

impl GcId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Wire tag of a saved Lua value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SavedLuaValueType {
    Nil = 0,
    BoolFalse = 1,
    BoolTrue = 2,
    Number = 3,
    String = 4,
    Table = 5,
    TableWithMeta = 6,
    ExistingGCObject = 7,
    LuaObject = 8,
}

impl SavedLuaValueType {
    /// Creates a SavedLuaValueType from its wire representation.
    pub fn from_u8(v: u8) -> Option<SavedLuaValueType> {
        match v {
            0 => Some(SavedLuaValueType::Nil),
            1 => Some(SavedLuaValueType::BoolFalse),
            2 => Some(SavedLuaValueType::BoolTrue),
            3 => Some(SavedLuaValueType::Number),
            4 => Some(SavedLuaValueType::String),
            5 => Some(SavedLuaValueType::Table),
            6 => Some(SavedLuaValueType::TableWithMeta),
            7 => Some(SavedLuaValueType::ExistingGCObject),
            8 => Some(SavedLuaValueType::LuaObject),
            _ => None,
        }
    }
}

/// One node of a decoded mod state.
///
/// Tables are shared with the owning mod's back-reference arena, so a
/// [`SavedLuaValue::Table`] and the result of `ScriptDat::lookup` for the
/// same gcid are the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedLuaValue {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Table(Arc<LuaTable>),
    /// A second sighting of an already decoded table or LuaObject. The
    /// target is resolved on demand through `ScriptDat::lookup`.
    ExistingGCObjectRef(GcId),
    LuaObject(Arc<LuaObject>),
}

impl SavedLuaValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SavedLuaValue::Nil => "nil",
            SavedLuaValue::Bool(_) => "boolean",
            SavedLuaValue::Number(_) => "number",
            SavedLuaValue::String(_) => "string",
            SavedLuaValue::Table(_) => "table",
            SavedLuaValue::ExistingGCObjectRef(_) => "reference",
            SavedLuaValue::LuaObject(_) => "LuaObject",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SavedLuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SavedLuaValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SavedLuaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            SavedLuaValue::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// A decoded Lua table.
#[derive(Debug, Clone, PartialEq)]
pub struct LuaTable {
    pub gcid: GcId,
    /// Registered metatable name, for tables saved with one.
    pub metatable: Option<String>,
    /// Key/value pairs in stream order.
    pub entries: Vec<(SavedLuaValue, SavedLuaValue)>,
}

impl LuaTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under the string key `key`.
    pub fn get(&self, key: &str) -> Option<&SavedLuaValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Value stored under the numeric key `key`.
    pub fn get_index(&self, key: f64) -> Option<&SavedLuaValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_f64() == Some(key))
            .map(|(_, v)| v)
    }
}
