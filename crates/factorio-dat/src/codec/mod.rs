//! Binary encoding/decoding.
//!
//! `primitives` holds the bounds-checked reader and writer; the other
//! modules implement one wire format each.

pub mod lua_object;
pub mod primitives;
pub mod property_tree;
pub mod script_dat;
pub mod settings;
pub mod version;

pub use lua_object::decode_lua_object;
pub use primitives::{Reader, Writer};
pub use property_tree::{
    decode_property_tree, encode_property_tree, read_property_tree, write_property_tree,
};
pub use script_dat::{DecodeOptions, decode_script_dat, decode_script_dat_with_options};
pub use settings::{decode_mod_settings, decode_mod_settings_with_options, encode_mod_settings};
pub use version::{decode_version, encode_version};
