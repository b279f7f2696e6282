//! Typed view over a decoded mod-settings.dat tree.

use crate::model::{MapVersion, PropertyDict, PropertyTree};

/// Setting scopes, in the order the game writes them.
pub const SETTING_SCOPES: [&str; 3] = ["startup", "runtime-global", "runtime-per-user"];

/// A decoded mod-settings.dat file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModSettings {
    pub version: MapVersion,
    pub tree: PropertyTree,
}

impl ModSettings {
    pub fn new(version: MapVersion, tree: PropertyTree) -> Self {
        Self { version, tree }
    }

    /// The dictionary for one scope (`startup`, `runtime-global`, `runtime-per-user`).
    pub fn scope(&self, scope: &str) -> Option<&PropertyDict> {
        self.tree.get(scope).and_then(PropertyTree::as_dict)
    }

    /// The `value` entry of `setting` within `scope`.
    pub fn value(&self, scope: &str, setting: &str) -> Option<&PropertyTree> {
        self.tree.path(&[scope, setting, "value"])
    }

    /// Every `(scope, setting, value)` triple, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &PropertyTree)> {
        SETTING_SCOPES.iter().filter_map(|scope| Some((*scope, self.scope(scope)?))).flat_map(
            |(scope, dict)| {
                dict.iter()
                    .filter_map(move |(name, entry)| Some((scope, name, entry.get("value")?)))
            },
        )
    }
}
