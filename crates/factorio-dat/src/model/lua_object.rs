//! Engine object handles persisted inside script.dat.
//!
//! A saved LuaObject is a type code plus a short fixed-layout payload that
//! locates the engine object (an entity id, a force index, a prototype name
//! and so on). Layouts are pure data: every type code maps to a static list
//! of typed fields, and a single decoder walks that list.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::GcId;

/// Fixed-point map coordinate, in 1/256 tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MapPosition {
    pub x: i32,
    pub y: i32,
}

impl MapPosition {
    pub const UNITS_PER_TILE: f64 = 256.0;

    /// Returns the position in (fractional) tiles.
    pub fn to_tiles(self) -> (f64, f64) {
        (
            self.x as f64 / Self::UNITS_PER_TILE,
            self.y as f64 / Self::UNITS_PER_TILE,
        )
    }
}

/// Chunk coordinate (32x32 tiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkPosition {
    pub x: i32,
    pub y: i32,
}

/// Tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

/// Wire shape of one payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    MapPosition,
    ChunkPosition,
    TilePosition,
    /// Packed (8→32) length-prefixed UTF-8.
    Str,
}

/// One named field in a payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// A decoded payload field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    MapPosition(MapPosition),
    ChunkPosition(ChunkPosition),
    TilePosition(TilePosition),
    Str(String),
}

impl FieldValue {
    /// Integer fields widened to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U8(v) => Some(*v as u64),
            FieldValue::U16(v) => Some(*v as u64),
            FieldValue::U32(v) => Some(*v as u64),
            FieldValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U8(v) => write!(f, "{v}"),
            FieldValue::U16(v) => write!(f, "{v}"),
            FieldValue::U32(v) => write!(f, "{v}"),
            FieldValue::U64(v) => write!(f, "{v}"),
            FieldValue::MapPosition(p) => {
                let (x, y) = p.to_tiles();
                write!(f, "{{{x}, {y}}}")
            }
            FieldValue::ChunkPosition(p) => write!(f, "chunk {{{}, {}}}", p.x, p.y),
            FieldValue::TilePosition(p) => write!(f, "tile {{{}, {}}}", p.x, p.y),
            FieldValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A decoded engine object handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuaObject {
    pub gcid: GcId,
    pub object_type: LuaObjectType,
    /// Fields in layout order.
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl LuaObject {
    /// Returns the field called `name`.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

macro_rules! lua_object_types {
    (@layout $( $field:literal : $kind:ident ),* ) => {
        &[ $( FieldSpec { name: $field, kind: FieldKind::$kind } ),* ]
    };
    (@persistable [ $( $field:literal )* ]) => { true };
    (@persistable) => { false };
    (
        $( $code:literal => $name:ident $( [ $( $field:literal : $kind:ident ),* ] )? ),* $(,)?
    ) => {
        /// Closed registry of engine object classes that script state can hold.
        ///
        /// The discriminant is the wire type code. Variants declared without a
        /// layout are process-global handles that can never be persisted.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum LuaObjectType {
            $( $name = $code, )*
        }

        impl LuaObjectType {
            /// Every registered type, in code order.
            pub const ALL: &'static [LuaObjectType] = &[ $( LuaObjectType::$name, )* ];

            /// Creates a LuaObjectType from its wire type code.
            pub fn from_u32(v: u32) -> Option<LuaObjectType> {
                match v {
                    $( $code => Some(LuaObjectType::$name), )*
                    _ => None,
                }
            }

            /// Class name as Lua scripts see it.
            pub fn name(self) -> &'static str {
                match self {
                    $( LuaObjectType::$name => stringify!($name), )*
                }
            }

            /// Payload layout. Empty for non-persistable types.
            pub fn layout(self) -> &'static [FieldSpec] {
                match self {
                    $( LuaObjectType::$name => lua_object_types!(@layout $( $( $field : $kind ),* )?), )*
                }
            }

            /// Returns false for handles that cannot appear in a snapshot.
            pub fn is_persistable(self) -> bool {
                match self {
                    $( LuaObjectType::$name => lua_object_types!(@persistable $( [ $( $field )* ] )?), )*
                }
            }
        }
    };
}

lua_object_types! {
    0 => LuaAISettings ["entity_id": U64],
    1 => LuaAccumulatorControlBehavior ["entity_id": U64],
    2 => LuaAchievementPrototype ["name": Str],
    3 => LuaAmmoCategoryPrototype ["name": Str],
    4 => LuaArithmeticCombinatorControlBehavior ["entity_id": U64],
    5 => LuaAutoplaceControlPrototype ["name": Str],
    6 => LuaBootstrap,
    7 => LuaBurner ["owner_kind": U8, "owner_id": U64],
    8 => LuaBurnerPrototype ["prototype_name": Str],
    9 => LuaChunkIterator ["surface_index": U32, "next_chunk": ChunkPosition],
    10 => LuaCircuitNetwork ["entity_id": U64, "wire_type": U8, "connector_id": U8],
    11 => LuaCommandProcessor,
    12 => LuaConstantCombinatorControlBehavior ["entity_id": U64],
    13 => LuaContainerControlBehavior ["entity_id": U64],
    14 => LuaCustomChartTag ["force_index": U8, "surface_index": U32, "tag_number": U32],
    15 => LuaCustomInputPrototype ["name": Str],
    16 => LuaCustomTable,
    17 => LuaDamagePrototype ["name": Str],
    18 => LuaDeciderCombinatorControlBehavior ["entity_id": U64],
    19 => LuaDecorativePrototype ["name": Str],
    20 => LuaElectricEnergySourcePrototype ["prototype_name": Str],
    21 => LuaEntity ["surface_index": U32, "position": MapPosition, "entity_id": U64],
    22 => LuaEntityPrototype ["name": Str],
    23 => LuaEquipment ["grid_id": U32, "equipment_index": U32],
    24 => LuaEquipmentCategoryPrototype ["name": Str],
    25 => LuaEquipmentGrid ["grid_id": U32],
    26 => LuaEquipmentGridPrototype ["name": Str],
    27 => LuaEquipmentPrototype ["name": Str],
    28 => LuaFlowStatistics ["force_index": U8, "statistics_kind": U8],
    29 => LuaFluidBox ["entity_id": U64],
    30 => LuaFluidBoxPrototype ["entity_name": Str, "index": U32],
    31 => LuaFluidEnergySourcePrototype ["prototype_name": Str],
    32 => LuaFluidPrototype ["name": Str],
    33 => LuaFontPrototype ["name": Str],
    34 => LuaForce ["force_index": U8],
    35 => LuaFurnaceControlBehavior ["entity_id": U64],
    36 => LuaGameScript,
    37 => LuaGenericOnOffControlBehavior ["entity_id": U64],
    38 => LuaGroup ["name": Str],
    39 => LuaGui ["player_index": U16],
    40 => LuaGuiElement ["player_index": U16, "element_index": U32],
    41 => LuaHeatEnergySourcePrototype ["prototype_name": Str],
    42 => LuaInserterControlBehavior ["entity_id": U64],
    43 => LuaInventory ["owner_kind": U8, "owner_id": U64, "inventory_index": U8],
    44 => LuaItemPrototype ["name": Str],
    45 => LuaItemStack ["owner_kind": U8, "owner_id": U64, "inventory_index": U8, "slot_index": U16],
    46 => LuaLampControlBehavior ["entity_id": U64],
    47 => LuaLazyLoadedValue,
    48 => LuaLogisticCell ["entity_id": U64],
    49 => LuaLogisticContainerControlBehavior ["entity_id": U64],
    50 => LuaLogisticNetwork ["force_index": U8, "network_id": U32],
    51 => LuaLogisticPoint ["entity_id": U64, "point_index": U8],
    52 => LuaMiningDrillControlBehavior ["entity_id": U64],
    53 => LuaModSettingPrototype ["name": Str],
    54 => LuaModuleCategoryPrototype ["name": Str],
    55 => LuaNamedNoiseExpression ["name": Str],
    56 => LuaNoiseLayerPrototype ["name": Str],
    57 => LuaParticlePrototype ["name": Str],
    58 => LuaPermissionGroup ["group_id": U32],
    59 => LuaPermissionGroups,
    60 => LuaPlayer ["player_index": U16],
    61 => LuaProfiler,
    62 => LuaProgrammableSpeakerControlBehavior ["entity_id": U64],
    63 => LuaRCON,
    64 => LuaRailChainSignalControlBehavior ["entity_id": U64],
    65 => LuaRailPath ["train_id": U32],
    66 => LuaRailSignalControlBehavior ["entity_id": U64],
    67 => LuaRandomGenerator ["seed_a": U32, "seed_b": U32, "seed_c": U32],
    68 => LuaRecipe ["force_index": U8, "name": Str],
    69 => LuaRecipeCategoryPrototype ["name": Str],
    70 => LuaRecipePrototype ["name": Str],
    71 => LuaRemote,
    72 => LuaRendering,
    73 => LuaResourceCategoryPrototype ["name": Str],
    74 => LuaRoboportControlBehavior ["entity_id": U64],
    75 => LuaSettings,
    76 => LuaShortcutPrototype ["name": Str],
    77 => LuaStorageTankControlBehavior ["entity_id": U64],
    78 => LuaStyle ["player_index": U16, "element_index": U32],
    79 => LuaSurface ["surface_index": U32],
    80 => LuaTechnology ["force_index": U8, "name": Str],
    81 => LuaTechnologyPrototype ["name": Str],
    82 => LuaTile ["surface_index": U32, "position": TilePosition],
    83 => LuaTilePrototype ["name": Str],
    84 => LuaTrain ["train_id": U32],
    85 => LuaTrainStopControlBehavior ["entity_id": U64],
    86 => LuaTransportBeltControlBehavior ["entity_id": U64],
    87 => LuaTransportLine ["entity_id": U64, "line_index": U8],
    88 => LuaTrivialSmokePrototype ["name": Str],
    89 => LuaUnitGroup ["unit_group_id": U32],
    90 => LuaVirtualSignalPrototype ["name": Str],
    91 => LuaVoidEnergySourcePrototype ["prototype_name": Str],
    92 => LuaWallControlBehavior ["entity_id": U64],
}

lazy_static! {
    static ref TYPES_BY_NAME: FxHashMap<&'static str, LuaObjectType> = LuaObjectType::ALL
        .iter()
        .map(|ty| (ty.name(), *ty))
        .collect();
}

impl LuaObjectType {
    /// Looks a type up by its class name.
    pub fn from_name(name: &str) -> Option<LuaObjectType> {
        TYPES_BY_NAME.get(name).copied()
    }
}

/// Error for [`LuaObjectType::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown LuaObject class {0:?}")]
pub struct UnknownLuaObjectClass(pub String);

impl FromStr for LuaObjectType {
    type Err = UnknownLuaObjectClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownLuaObjectClass(s.to_owned()))
    }
}

impl fmt::Display for LuaObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
