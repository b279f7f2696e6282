//! mod-settings.dat encoding/decoding: a version header followed by one
//! PropertyTree.

use crate::codec::primitives::{Reader, Writer};
use crate::codec::property_tree::{read_property_tree, write_property_tree};
use crate::codec::script_dat::DecodeOptions;
use crate::codec::version::{decode_version, encode_version};
use crate::error::{DecodeError, EncodeError};
use crate::model::{MapVersion, ModSettings};

/// Decodes a mod-settings.dat file with default options.
pub fn decode_mod_settings(input: &[u8]) -> Result<ModSettings, DecodeError> {
    decode_mod_settings_with_options(input, DecodeOptions::default())
}

/// Decodes a mod-settings.dat file. The whole input must be consumed.
pub fn decode_mod_settings_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<ModSettings, DecodeError> {
    let mut reader = Reader::new(input);
    let version = decode_version(&mut reader)?;
    if options.strict_version && version.branch != 0 {
        return Err(DecodeError::VersionMismatch {
            expected: MapVersion { branch: 0, ..version },
            found: version,
        });
    }

    let tree = read_property_tree(&mut reader, options.max_depth)?;
    reader.expect_end("mod settings")?;
    Ok(ModSettings::new(version, tree))
}

/// Encodes a mod-settings.dat file.
pub fn encode_mod_settings(settings: &ModSettings) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    encode_version(&mut writer, &settings.version);
    write_property_tree(&mut writer, &settings.tree)?;
    Ok(writer.into_bytes())
}
