//! Decoding limits and fixed wire sizes.
//!
//! Length prefixes in both formats come straight from untrusted bytes, so
//! every count is checked against these bounds before allocating.

/// Byte width of a version header: four u16 fields and a branch byte.
pub const VERSION_HEADER_LEN: usize = 9;

/// Maximum length of any single string, in bytes.
pub const MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Maximum nesting depth for tables and PropertyTree containers.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Maximum number of mods in one script.dat document.
pub const MAX_MOD_COUNT: usize = 65_536;

/// Maximum number of key/value pairs in one Lua table.
pub const MAX_TABLE_ENTRIES: usize = 16 * 1024 * 1024;

/// Maximum element count of one PropertyTree list or dictionary.
pub const MAX_COLLECTION_LEN: usize = 16 * 1024 * 1024;
