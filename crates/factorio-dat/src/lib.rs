//! Decoders for Factorio's per-mod save state (script.dat) and the
//! PropertyTree format used by mod-settings.dat.
//!
//! # Overview
//!
//! - **script.dat** holds the `global` table of every mod in a save. Each
//!   mod's state is an independent sub-stream of tagged Lua values with
//!   per-mod object identity (gcids), back-references to earlier tables, and
//!   engine object handles (`LuaEntity`, `LuaPlayer`, ...) with fixed-layout
//!   payloads selected by a type code.
//! - **PropertyTree** is a small recursive value format (none, bool, number,
//!   string, list, dictionary) with a lossless encoder.
//!
//! # Quick Start
//!
//! ```rust
//! use factorio_dat::{PropertyTree, PropertyDict, decode_property_tree, encode_property_tree};
//!
//! let mut dict = PropertyDict::new();
//! dict.insert("value", PropertyTree::Number(3.5));
//! let tree = PropertyTree::Dict(dict);
//!
//! let bytes = encode_property_tree(&tree).unwrap();
//! assert_eq!(decode_property_tree(&bytes).unwrap(), tree);
//! ```
//!
//! Decoding a save's script.dat (already extracted from the zip):
//!
//! ```ignore
//! let doc = factorio_dat::decode_script_dat(&bytes)?;
//! for state in doc.mods() {
//!     println!("{}: {}", state.name, state.root.type_name());
//! }
//! ```
//!
//! # Modules
//!
//! - [`model`]: Decoded data types
//! - [`codec`]: Binary decoding (and PropertyTree encoding)
//! - [`validate`]: Semantic validation
//! - [`error`]: Error types
//! - [`limits`]: Decoding limits
//!
//! # Errors
//!
//! Decoding is all-or-nothing. Nested values carry no length of their own,
//! so any short read, unknown tag or leftover byte aborts the whole call;
//! errors report the absolute byte offset where decoding stopped.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    DecodeOptions, decode_mod_settings, decode_mod_settings_with_options, decode_property_tree,
    decode_script_dat, decode_script_dat_with_options, encode_mod_settings, encode_property_tree,
};
pub use error::{DecodeError, EncodeError, ErrorCode, ValidationError};
pub use model::{
    FieldValue, GcId, GcObject, LuaObject, LuaObjectType, LuaTable, MapPosition, MapVersion,
    ModSettings, ModState, PropertyDict, PropertyTree, SavedLuaValue, ScriptDat,
};
pub use validate::{validate_mod_settings, validate_script_dat};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
