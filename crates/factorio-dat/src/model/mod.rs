//! Data model types.
//!
//! This module contains the plain data produced by the codecs:
//! - Version headers
//! - PropertyTree values (settings interchange)
//! - Saved Lua values, tables and engine object handles (script.dat)
//! - Whole documents

pub mod lua_object;
pub mod property_tree;
pub mod saved_value;
pub mod script_dat;
pub mod settings;
pub mod version;

pub use lua_object::{
    ChunkPosition, FieldKind, FieldSpec, FieldValue, LuaObject, LuaObjectType, MapPosition,
    TilePosition, UnknownLuaObjectClass,
};
pub use property_tree::{PropertyDict, PropertyTree, PropertyTreeType};
pub use saved_value::{GcId, LuaTable, SavedLuaValue, SavedLuaValueType};
pub use script_dat::{GcObject, ModState, ScriptDat};
pub use settings::{ModSettings, SETTING_SCOPES};
pub use version::MapVersion;
