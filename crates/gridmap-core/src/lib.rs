//! # gridmap-core: Power Grid Domain Model
//!
//! Provides the strongly typed entities that the mapping engine in
//! `gridmap-io` decodes from and flattens into flat field records.
//!
//! ## Design Philosophy
//!
//! The model is a closed set of entity kinds:
//! - **Grid**: operators, voltage levels, nodes, line types, lines, line graphics
//! - **Participants**: loads, energy managers, CHP plants and their types
//! - **Thermal**: thermal buses and cylindrical storages
//! - **Results and time series**: node/load results, time-based values and
//!   their weather sub-values
//!
//! Entities are immutable once constructed and reference each other through
//! `Arc`, so a line shares its node instances with every other asset
//! connected to them. Every constructor validates its domain rules and
//! returns a [`MappingResult`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use gridmap_core::input::{no_operator_assigned, NodeInput, OperationTime, VoltageLevel};
//! use gridmap_core::units::{Quantity, Unit};
//! use gridmap_core::{Entity, EntityKind};
//! use uuid::Uuid;
//!
//! let hv = Arc::new(VoltageLevel::new("hv", Quantity::new(110.0, Unit::Kilovolt)).unwrap());
//! let node = NodeInput::new(
//!     Uuid::new_v4(),
//!     "Node 1",
//!     no_operator_assigned(),
//!     OperationTime::not_limited(),
//!     Quantity::new(1.0, Unit::PerUnit),
//!     true,
//!     None,
//!     hv,
//!     3,
//! )
//! .unwrap();
//!
//! let entity = Entity::from(node);
//! assert_eq!(entity.kind(), EntityKind::Node);
//! assert_eq!(entity.label(), "Node 1");
//! ```
//!
//! ## Core Data Structures
//!
//! - [`EntityKind`] - Closed tag of every mappable type
//! - [`Entity`] - Sum type holding one `Arc`'d entity of any kind
//! - [`EntityKey`] - Identity (kind + uuid) used for deduplication
//! - [`Value`] - Decoded leaf value or entity, the currency of constructors
//! - [`relations::Relation`] - Relation tags consumed by dependency extraction
//!
//! ## Modules
//!
//! - [`units`] - Units, unit families and quantities
//! - [`geo`] - GeoJSON points
//! - [`input`] - Input model (grid, participants, thermal)
//! - [`result`] - Simulation results
//! - [`timeseries`] - Time-based values and series
//! - [`relations`] - Relation tags
//! - [`error`] - Error taxonomy
//! - [`diagnostics`] - Per-row issue collection for batches
//!
//! ## Integration with gridmap-io
//!
//! The gridmap-io crate owns the field catalog, the strategy registry and the
//! processor that turn these entities into flat records and back.

use std::sync::Arc;

use uuid::Uuid;

pub mod diagnostics;
pub mod error;
pub mod geo;
pub mod input;
pub mod relations;
pub mod result;
pub mod timeseries;
pub mod units;
pub mod value;

pub use diagnostics::{BatchDiagnostics, BatchStats, DiagnosticIssue, Diagnostics, Severity};
pub use error::{MappingError, MappingResult};
pub use geo::GeoPoint;
pub use relations::{Relation, RelationKind};
pub use units::{Quantity, Unit, UnitFamily};
pub use value::Value;

use input::{
    ChpInput, ChpTypeInput, CylindricalStorageInput, EmInput, LineGraphicInput, LineInput,
    LineTypeInput, LoadInput, NodeInput, OperatorInput, ThermalBusInput, VoltageLevel,
};
use result::{LoadResult, NodeResult};
use timeseries::{IrradianceValue, TemperatureValue, TimeBasedValue, WindValue};

/// Generates [`EntityKind`], [`Entity`] and the conversions between them.
///
/// Each row is `Variant(Type) => "TypeName", "reference key", accessor`.
/// The reference key is the field name under which other records refer to an
/// entity of this kind.
macro_rules! entity_table {
    ($($variant:ident($ty:ty) => $name:literal, $key:literal, $accessor:ident;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EntityKind {
            $($variant,)*
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$variant,)*];

            /// Type name, as used in diagnostics.
            pub fn name(self) -> &'static str {
                match self {
                    $(EntityKind::$variant => $name,)*
                }
            }

            /// Field name under which records reference this kind.
            pub fn key(self) -> &'static str {
                match self {
                    $(EntityKind::$variant => $key,)*
                }
            }
        }

        #[derive(Debug, Clone, PartialEq)]
        pub enum Entity {
            $($variant(Arc<$ty>),)*
        }

        impl Entity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Entity::$variant(_) => EntityKind::$variant,)*
                }
            }

            /// Whether both values hold the very same allocation.
            pub fn ptr_eq(&self, other: &Entity) -> bool {
                match (self, other) {
                    $((Entity::$variant(a), Entity::$variant(b)) => Arc::ptr_eq(a, b),)*
                    _ => false,
                }
            }

            $(
                pub fn $accessor(&self) -> Option<&Arc<$ty>> {
                    match self {
                        Entity::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$ty> for Entity {
                fn from(inner: $ty) -> Self {
                    Entity::$variant(Arc::new(inner))
                }
            }

            impl From<Arc<$ty>> for Entity {
                fn from(inner: Arc<$ty>) -> Self {
                    Entity::$variant(inner)
                }
            }
        )*
    };
}

entity_table! {
    Operator(OperatorInput) => "OperatorInput", "operator", as_operator;
    VoltageLevel(VoltageLevel) => "VoltageLevel", "voltlvl", as_voltage_level;
    Node(NodeInput) => "NodeInput", "node", as_node;
    LineType(LineTypeInput) => "LineTypeInput", "type", as_line_type;
    Line(LineInput) => "LineInput", "line", as_line;
    LineGraphic(LineGraphicInput) => "LineGraphicInput", "linegraphic", as_line_graphic;
    Load(LoadInput) => "LoadInput", "load", as_load;
    EnergyManager(EmInput) => "EmInput", "em", as_energy_manager;
    ChpType(ChpTypeInput) => "ChpTypeInput", "type", as_chp_type;
    Chp(ChpInput) => "ChpInput", "chp", as_chp;
    ThermalBus(ThermalBusInput) => "ThermalBusInput", "thermalbus", as_thermal_bus;
    CylindricalStorage(CylindricalStorageInput) => "CylindricalStorageInput", "thermalstorage", as_cylindrical_storage;
    NodeResult(NodeResult) => "NodeResult", "noderesult", as_node_result;
    LoadResult(LoadResult) => "LoadResult", "loadresult", as_load_result;
    TimeBasedValue(TimeBasedValue) => "TimeBasedValue", "timebasedvalue", as_time_based_value;
    Irradiance(IrradianceValue) => "IrradianceValue", "irradiance", as_irradiance;
    Temperature(TemperatureValue) => "TemperatureValue", "temperature", as_temperature;
    Wind(WindValue) => "WindValue", "wind", as_wind;
}

impl EntityKind {
    /// Whether instances carry a uuid of their own. Value objects don't.
    pub fn is_identified(self) -> bool {
        !matches!(
            self,
            EntityKind::VoltageLevel
                | EntityKind::Irradiance
                | EntityKind::Temperature
                | EntityKind::Wind
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of an entity: two entities with the same key are the same asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub uuid: Uuid,
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.uuid)
    }
}

impl Entity {
    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Entity::Operator(e) => Some(e.uuid),
            Entity::Node(e) => Some(e.uuid),
            Entity::LineType(e) => Some(e.uuid),
            Entity::Line(e) => Some(e.uuid),
            Entity::LineGraphic(e) => Some(e.uuid),
            Entity::Load(e) => Some(e.uuid),
            Entity::EnergyManager(e) => Some(e.uuid),
            Entity::ChpType(e) => Some(e.uuid),
            Entity::Chp(e) => Some(e.uuid),
            Entity::ThermalBus(e) => Some(e.uuid),
            Entity::CylindricalStorage(e) => Some(e.uuid),
            Entity::NodeResult(e) => Some(e.uuid),
            Entity::LoadResult(e) => Some(e.uuid),
            Entity::TimeBasedValue(e) => Some(e.uuid),
            Entity::VoltageLevel(_)
            | Entity::Irradiance(_)
            | Entity::Temperature(_)
            | Entity::Wind(_) => None,
        }
    }

    pub fn key(&self) -> Option<EntityKey> {
        self.uuid().map(|uuid| EntityKey {
            kind: self.kind(),
            uuid,
        })
    }

    /// Returns a human-readable label (the asset id, else the uuid).
    pub fn label(&self) -> String {
        let id = match self {
            Entity::Operator(e) => &e.id,
            Entity::VoltageLevel(e) => &e.id,
            Entity::Node(e) => &e.id,
            Entity::LineType(e) => &e.id,
            Entity::Line(e) => &e.id,
            Entity::Load(e) => &e.id,
            Entity::EnergyManager(e) => &e.id,
            Entity::ChpType(e) => &e.id,
            Entity::Chp(e) => &e.id,
            Entity::ThermalBus(e) => &e.id,
            Entity::CylindricalStorage(e) => &e.id,
            Entity::LineGraphic(_)
            | Entity::NodeResult(_)
            | Entity::LoadResult(_)
            | Entity::TimeBasedValue(_)
            | Entity::Irradiance(_)
            | Entity::Temperature(_)
            | Entity::Wind(_) => {
                return self
                    .uuid()
                    .map_or_else(|| self.kind().name().to_string(), |u| u.to_string())
            }
        };
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::{no_operator_assigned, OperationTime};
    use units::{Quantity, Unit};

    fn node(id: &str) -> NodeInput {
        let lv = Arc::new(VoltageLevel::new("lv", Quantity::new(0.4, Unit::Kilovolt)).unwrap());
        NodeInput::new(
            Uuid::new_v4(),
            id,
            no_operator_assigned(),
            OperationTime::not_limited(),
            Quantity::new(1.0, Unit::PerUnit),
            false,
            None,
            lv,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_kind_table() {
        assert_eq!(EntityKind::ALL.len(), 18);
        assert_eq!(EntityKind::Node.name(), "NodeInput");
        assert_eq!(EntityKind::EnergyManager.key(), "em");
        assert_eq!(format!("{}", EntityKind::Line), "LineInput");
        assert!(!EntityKind::VoltageLevel.is_identified());
        assert!(EntityKind::TimeBasedValue.is_identified());
    }

    #[test]
    fn test_entity_identity() {
        let n = node("Node 1");
        let uuid = n.uuid;
        let entity = Entity::from(n);

        assert_eq!(entity.kind(), EntityKind::Node);
        assert_eq!(entity.uuid(), Some(uuid));
        assert_eq!(
            entity.key(),
            Some(EntityKey {
                kind: EntityKind::Node,
                uuid
            })
        );
        assert_eq!(entity.label(), "Node 1");
        assert!(entity.as_node().is_some());
        assert!(entity.as_line().is_none());
    }

    #[test]
    fn test_value_objects_have_no_key() {
        let lvl = Entity::from(VoltageLevel::new("mv", Quantity::new(20.0, Unit::Kilovolt)).unwrap());
        assert_eq!(lvl.key(), None);
        assert_eq!(lvl.label(), "mv");
    }

    #[test]
    fn test_ptr_eq() {
        let shared = Arc::new(node("shared"));
        let a = Entity::Node(Arc::clone(&shared));
        let b = Entity::Node(shared);
        let c = Entity::from(node("shared"));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
