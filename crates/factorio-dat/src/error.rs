//! Error types for script.dat / PropertyTree decoding, encoding and validation.

use thiserror::Error;

use crate::model::MapVersion;

/// Error classes shared by every decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: A read ran past the end of the buffer
    OutOfRange,
    /// E002: Unrecognized type tag or LuaObject type code
    UnknownTag,
    /// E003: Empty dictionary key
    MalformedKey,
    /// E004: Sub-stream not fully consumed by its root value
    UnconsumedTrailingData,
    /// E005: Recognized LuaObject type that cannot be persisted
    UnsupportedPersistedType,
    /// E006: Unexpected or unsupported version header
    VersionMismatch,
    /// E007: Invalid UTF-8 in a string field
    InvalidUtf8,
    /// E008: Structurally invalid data (bad reference, limits exceeded)
    MalformedEncoding,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::OutOfRange => "E001",
            ErrorCode::UnknownTag => "E002",
            ErrorCode::MalformedKey => "E003",
            ErrorCode::UnconsumedTrailingData => "E004",
            ErrorCode::UnsupportedPersistedType => "E005",
            ErrorCode::VersionMismatch => "E006",
            ErrorCode::InvalidUtf8 => "E007",
            ErrorCode::MalformedEncoding => "E008",
        }
    }
}

/// Error during binary decoding.
///
/// Every variant is fatal for the whole decode call; positions are absolute
/// byte offsets into the buffer handed to the top-level decode function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001 ===
    #[error("[E001] read of {needed} bytes for {context} at offset {position} exceeds buffer ({available} bytes left)")]
    OutOfRange {
        context: &'static str,
        position: usize,
        needed: usize,
        available: usize,
    },

    // === E002 ===
    #[error("[E002] unknown {context} tag {tag} at offset {position}")]
    UnknownTag {
        context: &'static str,
        tag: u8,
        position: usize,
    },

    #[error("[E002] unknown LuaObject type code {type_code} at offset {position}")]
    UnknownLuaObjectType { type_code: u32, position: usize },

    // === E003 ===
    #[error("[E003] empty dictionary key at offset {position}")]
    MalformedKey { position: usize },

    // === E004 ===
    #[error("[E004] {remaining} unconsumed bytes after {context} at offset {position}")]
    UnconsumedTrailingData {
        context: &'static str,
        remaining: usize,
        position: usize,
    },

    // === E005 ===
    #[error("[E005] {type_name} (type code {type_code}) cannot appear in a persisted snapshot")]
    UnsupportedPersistedType {
        type_name: &'static str,
        type_code: u32,
    },

    // === E006 ===
    #[error("[E006] version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: MapVersion, found: MapVersion },

    // === E007 ===
    #[error("[E007] invalid UTF-8 in {field} at offset {position}")]
    InvalidUtf8 { field: &'static str, position: usize },

    // === E008 ===
    #[error("[E008] reference to gcid {id} is not a completed object (next gcid is {next_gcid})")]
    InvalidReference { id: u32, next_gcid: u32 },

    #[error("[E008] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("[E008] nesting depth exceeds maximum {max}")]
    DepthLimitExceeded { max: usize },

    #[error("[E008] mod {name:?} appears more than once")]
    DuplicateMod { name: String },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::OutOfRange { .. } => ErrorCode::OutOfRange,
            DecodeError::UnknownTag { .. } | DecodeError::UnknownLuaObjectType { .. } => {
                ErrorCode::UnknownTag
            }
            DecodeError::MalformedKey { .. } => ErrorCode::MalformedKey,
            DecodeError::UnconsumedTrailingData { .. } => ErrorCode::UnconsumedTrailingData,
            DecodeError::UnsupportedPersistedType { .. } => ErrorCode::UnsupportedPersistedType,
            DecodeError::VersionMismatch { .. } => ErrorCode::VersionMismatch,
            DecodeError::InvalidUtf8 { .. } => ErrorCode::InvalidUtf8,
            _ => ErrorCode::MalformedEncoding,
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("dictionary key must not be empty")]
    EmptyKey,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("nesting depth exceeds maximum {max}")]
    DepthLimitExceeded { max: usize },
}

/// Error during semantic validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("settings root must be a dictionary, found {found}")]
    RootNotDictionary { found: &'static str },

    #[error("unknown settings scope {scope:?}")]
    UnknownScope { scope: String },

    #[error("settings scope {scope:?} must be a dictionary, found {found}")]
    ScopeNotDictionary { scope: String, found: &'static str },

    #[error("setting {setting:?} in scope {scope:?} must be a dictionary with a \"value\" entry")]
    MissingSettingValue { scope: String, setting: String },

    #[error("mod {mod_name:?} references gcid {id}, which is not a completed object in that mod")]
    DanglingReference { mod_name: String, id: u32 },

    #[error("mod {mod_name:?} stores gcid {gcid} in arena slot {slot}")]
    MisplacedObject {
        mod_name: String,
        slot: usize,
        gcid: u32,
    },
}
