//! Semantic validation for decoded documents.
//!
//! Structural validation happens during decode. These checks cover shapes
//! the wire format cannot express: the scope layout of a settings tree, and
//! reference integrity of documents assembled by hand rather than decoded.

use crate::error::ValidationError;
use crate::model::{ModState, PropertyTree, SETTING_SCOPES, SavedLuaValue, ScriptDat};

/// Validates the layout of a mod-settings tree.
///
/// The root must be a dictionary of known scopes; each scope maps setting
/// names to dictionaries holding a `value` entry. Missing scopes are allowed.
pub fn validate_mod_settings(tree: &PropertyTree) -> Result<(), ValidationError> {
    let root = tree.as_dict().ok_or(ValidationError::RootNotDictionary {
        found: tree.type_name(),
    })?;

    for (scope, settings) in root.iter() {
        if !SETTING_SCOPES.contains(&scope) {
            return Err(ValidationError::UnknownScope {
                scope: scope.to_owned(),
            });
        }
        let settings = settings
            .as_dict()
            .ok_or_else(|| ValidationError::ScopeNotDictionary {
                scope: scope.to_owned(),
                found: settings.type_name(),
            })?;
        for (name, entry) in settings.iter() {
            if entry.get("value").is_none() {
                return Err(ValidationError::MissingSettingValue {
                    scope: scope.to_owned(),
                    setting: name.to_owned(),
                });
            }
        }
    }

    Ok(())
}

/// Validates that every back-reference in each mod resolves within that mod,
/// and that each arena slot holds the object carrying that gcid.
pub fn validate_script_dat(doc: &ScriptDat) -> Result<(), ValidationError> {
    for state in doc.mods() {
        validate_arena(state)?;
        validate_references(state, &state.root)?;
    }
    Ok(())
}

fn validate_arena(state: &ModState) -> Result<(), ValidationError> {
    for (slot, object) in state.objects().iter().enumerate() {
        if object.gcid().index() != slot {
            return Err(ValidationError::MisplacedObject {
                mod_name: state.name.clone(),
                slot,
                gcid: object.gcid().0,
            });
        }
    }
    Ok(())
}

fn validate_references(state: &ModState, value: &SavedLuaValue) -> Result<(), ValidationError> {
    match value {
        SavedLuaValue::ExistingGCObjectRef(id) if state.object(*id).is_none() => {
            Err(ValidationError::DanglingReference {
                mod_name: state.name.clone(),
                id: id.0,
            })
        }
        SavedLuaValue::Table(table) => {
            for (key, value) in &table.entries {
                validate_references(state, key)?;
                validate_references(state, value)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::codec::{Writer, decode_script_dat, encode_version};
    use crate::model::{GcId, GcObject, LuaTable, MapVersion, PropertyDict, SavedLuaValueType};

    fn dict(entries: Vec<(&str, PropertyTree)>) -> PropertyTree {
        PropertyTree::Dict(entries.into_iter().collect::<PropertyDict>())
    }

    #[test]
    fn test_valid_settings() {
        let tree = dict(vec![
            ("startup", dict(vec![("a", dict(vec![("value", true.into())]))])),
            ("runtime-per-user", dict(vec![])),
        ]);
        assert_eq!(validate_mod_settings(&tree), Ok(()));
    }

    #[test]
    fn test_settings_root_must_be_dict() {
        assert_eq!(
            validate_mod_settings(&PropertyTree::List(vec![])),
            Err(ValidationError::RootNotDictionary { found: "list" })
        );
    }

    #[test]
    fn test_unknown_scope() {
        let tree = dict(vec![("runtime", dict(vec![]))]);
        assert!(matches!(
            validate_mod_settings(&tree),
            Err(ValidationError::UnknownScope { .. })
        ));
    }

    #[test]
    fn test_scope_not_dict() {
        let tree = dict(vec![("startup", 1.0.into())]);
        assert!(matches!(
            validate_mod_settings(&tree),
            Err(ValidationError::ScopeNotDictionary { found: "number", .. })
        ));
    }

    #[test]
    fn test_missing_value() {
        let tree = dict(vec![("startup", dict(vec![("a", dict(vec![]))]))]);
        assert_eq!(
            validate_mod_settings(&tree),
            Err(ValidationError::MissingSettingValue {
                scope: "startup".into(),
                setting: "a".into()
            })
        );
    }

    #[test]
    fn test_dangling_reference() {
        let table = Arc::new(LuaTable {
            gcid: GcId(0),
            metatable: None,
            entries: vec![(SavedLuaValue::Number(1.0), SavedLuaValue::ExistingGCObjectRef(GcId(3)))],
        });
        let state = ModState::new(
            "m",
            SavedLuaValue::Table(Arc::clone(&table)),
            vec![GcObject::Table(table)],
        );
        let doc = ScriptDat::new(MapVersion::default(), vec![state]);
        assert_eq!(
            validate_script_dat(&doc),
            Err(ValidationError::DanglingReference {
                mod_name: "m".into(),
                id: 3
            })
        );
    }

    #[test]
    fn test_misplaced_arena_slot() {
        let first = Arc::new(LuaTable {
            gcid: GcId(0),
            metatable: None,
            entries: vec![],
        });
        let second = Arc::new(LuaTable {
            gcid: GcId(1),
            metatable: None,
            entries: vec![(SavedLuaValue::Number(1.0), SavedLuaValue::ExistingGCObjectRef(GcId(0)))],
        });
        // every reference resolves to some slot, but the slots are swapped
        let state = ModState::new(
            "m",
            SavedLuaValue::Table(Arc::clone(&second)),
            vec![GcObject::Table(second), GcObject::Table(first)],
        );
        let doc = ScriptDat::new(MapVersion::default(), vec![state]);
        assert_eq!(
            validate_script_dat(&doc),
            Err(ValidationError::MisplacedObject {
                mod_name: "m".into(),
                slot: 0,
                gcid: 1
            })
        );
    }

    #[test]
    fn test_decoded_documents_validate() {
        // { a = {}, b = <ref a> } under two mods
        let mut value = Writer::new();
        value.write_u8(SavedLuaValueType::Table as u8);
        value.write_packed_u8_32(2);
        value.write_u8(SavedLuaValueType::String as u8);
        value.write_packed_string("a");
        value.write_u8(SavedLuaValueType::Table as u8);
        value.write_packed_u8_32(0);
        value.write_u8(SavedLuaValueType::String as u8);
        value.write_packed_string("b");
        value.write_u8(SavedLuaValueType::ExistingGCObject as u8);
        value.write_packed_u16_32(1);

        let version = MapVersion::new(1, 1, 110, 0);
        let mut data = Writer::new();
        encode_version(&mut data, &version);
        data.write_bytes(value.as_bytes());

        let mut writer = Writer::new();
        encode_version(&mut writer, &version);
        writer.write_u32(2);
        for name in ["first", "second"] {
            writer.write_packed_string(name);
            writer.write_packed_u8_32(data.len() as u32);
            writer.write_bytes(data.as_bytes());
            writer.write_u8(0);
        }

        let doc = decode_script_dat(writer.as_bytes()).unwrap();
        assert_eq!(doc.get("second").unwrap().object_count(), 2);
        assert_eq!(validate_script_dat(&doc), Ok(()));
    }
}
