//! Version header encoding/decoding.

use crate::codec::primitives::{Reader, Writer};
use crate::error::DecodeError;
use crate::model::MapVersion;

/// Reads the fixed-width version header.
pub fn decode_version(reader: &mut Reader<'_>) -> Result<MapVersion, DecodeError> {
    Ok(MapVersion {
        major: reader.read_u16("version.major")?,
        minor: reader.read_u16("version.minor")?,
        patch: reader.read_u16("version.patch")?,
        build: reader.read_u16("version.build")?,
        branch: reader.read_u8("version.branch")?,
    })
}

/// Writes the fixed-width version header.
pub fn encode_version(writer: &mut Writer, version: &MapVersion) {
    writer.write_u16(version.major);
    writer.write_u16(version.minor);
    writer.write_u16(version.patch);
    writer.write_u16(version.build);
    writer.write_u8(version.branch);
}
