//! Decoded script.dat document.

use std::sync::Arc;

use crate::model::{GcId, LuaObject, LuaTable, MapVersion, SavedLuaValue};

/// An object that owns a gcid.
#[derive(Debug, Clone, PartialEq)]
pub enum GcObject {
    Table(Arc<LuaTable>),
    LuaObject(Arc<LuaObject>),
}

impl GcObject {
    pub fn gcid(&self) -> GcId {
        match self {
            GcObject::Table(t) => t.gcid,
            GcObject::LuaObject(o) => o.gcid,
        }
    }

    /// Wraps the object back into a value node.
    pub fn to_value(&self) -> SavedLuaValue {
        match self {
            GcObject::Table(t) => SavedLuaValue::Table(Arc::clone(t)),
            GcObject::LuaObject(o) => SavedLuaValue::LuaObject(Arc::clone(o)),
        }
    }
}

/// The saved state of one mod: its root value plus the gcid arena used to
/// resolve back-references within it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModState {
    pub name: String,
    pub root: SavedLuaValue,
    /// Indexed by gcid.
    objects: Vec<GcObject>,
}

impl ModState {
    /// Assembles a mod state. `objects[i]` must carry gcid `i`; see
    /// `validate_script_dat`.
    pub fn new(name: impl Into<String>, root: SavedLuaValue, objects: Vec<GcObject>) -> Self {
        Self {
            name: name.into(),
            root,
            objects,
        }
    }

    /// Number of gcids issued while decoding this mod.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[GcObject] {
        &self.objects
    }

    pub fn object(&self, id: GcId) -> Option<&GcObject> {
        self.objects.get(id.index())
    }

    /// The table that owns `id`, if `id` names a table.
    pub fn lookup(&self, id: GcId) -> Option<&LuaTable> {
        match self.object(id)? {
            GcObject::Table(t) => Some(t),
            GcObject::LuaObject(_) => None,
        }
    }

    /// The LuaObject that owns `id`, if `id` names one.
    pub fn lookup_object(&self, id: GcId) -> Option<&LuaObject> {
        match self.object(id)? {
            GcObject::LuaObject(o) => Some(o),
            GcObject::Table(_) => None,
        }
    }

    /// Follows one back-reference. Non-reference values are returned as is;
    /// a dangling reference yields `None`.
    pub fn resolve(&self, value: &SavedLuaValue) -> Option<SavedLuaValue> {
        match value {
            SavedLuaValue::ExistingGCObjectRef(id) => self.object(*id).map(GcObject::to_value),
            other => Some(other.clone()),
        }
    }
}

/// A fully decoded script.dat document.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDat {
    pub version: MapVersion,
    mods: Vec<ModState>,
}

impl ScriptDat {
    pub fn new(version: MapVersion, mods: Vec<ModState>) -> Self {
        Self { version, mods }
    }

    /// Mods in stream order.
    pub fn mods(&self) -> &[ModState] {
        &self.mods
    }

    pub fn mod_names(&self) -> impl Iterator<Item = &str> {
        self.mods.iter().map(|m| m.name.as_str())
    }

    pub fn get(&self, mod_name: &str) -> Option<&ModState> {
        self.mods.iter().find(|m| m.name == mod_name)
    }

    /// Root value saved by `mod_name`.
    pub fn root(&self, mod_name: &str) -> Option<&SavedLuaValue> {
        self.get(mod_name).map(|m| &m.root)
    }

    /// Resolves `id` against `mod_name`'s back-reference table.
    pub fn lookup(&self, mod_name: &str, id: GcId) -> Option<&LuaTable> {
        self.get(mod_name)?.lookup(id)
    }

    pub fn lookup_object(&self, mod_name: &str, id: GcId) -> Option<&LuaObject> {
        self.get(mod_name)?.lookup_object(id)
    }

    pub fn resolve(&self, mod_name: &str, value: &SavedLuaValue) -> Option<SavedLuaValue> {
        self.get(mod_name)?.resolve(value)
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LuaObjectType;

    fn sample() -> ScriptDat {
        let table = Arc::new(LuaTable {
            gcid: GcId(0),
            metatable: None,
            entries: vec![(SavedLuaValue::Number(1.0), SavedLuaValue::Nil)],
        });
        let force = Arc::new(LuaObject {
            gcid: GcId(1),
            object_type: LuaObjectType::LuaForce,
            fields: vec![("force_index", crate::model::FieldValue::U8(1))],
        });
        let state = ModState::new(
            "base",
            SavedLuaValue::Table(Arc::clone(&table)),
            vec![GcObject::Table(table), GcObject::LuaObject(force)],
        );
        ScriptDat::new(MapVersion::new(1, 1, 0, 0), vec![state])
    }

    #[test]
    fn test_lookup_by_kind() {
        let doc = sample();
        assert!(doc.lookup("base", GcId(0)).is_some());
        assert!(doc.lookup("base", GcId(1)).is_none());
        assert_eq!(
            doc.lookup_object("base", GcId(1)).map(|o| o.object_type),
            Some(LuaObjectType::LuaForce)
        );
        assert!(doc.lookup("other", GcId(0)).is_none());
        assert!(doc.lookup("base", GcId(2)).is_none());
    }

    #[test]
    fn test_resolve_shares_allocation() {
        let doc = sample();
        let resolved = doc
            .resolve("base", &SavedLuaValue::ExistingGCObjectRef(GcId(0)))
            .unwrap();
        let (SavedLuaValue::Table(a), SavedLuaValue::Table(b)) = (&resolved, &doc.mods()[0].root)
        else {
            panic!("expected tables");
        };
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(
            doc.resolve("base", &SavedLuaValue::Number(2.0)),
            Some(SavedLuaValue::Number(2.0))
        );
        assert!(doc.resolve("base", &SavedLuaValue::ExistingGCObjectRef(GcId(9))).is_none());
    }
}
