//! Flattening: entities back into flat, unit-normalized records.
//!
//! Simple kinds are read through a per-kind accessor list. Time-based values
//! are assembled from several field sources (see [`timeseries`]). Every
//! quantity is converted into the unit the output table declares for its
//! (kind, field) pair before it is formatted; an undeclared pair is an error.

use std::collections::BTreeMap;

use gridmap_core::units::Quantity;
use gridmap_core::{Entity, EntityKind, MappingError, MappingResult, Value};

use crate::config::BooleanPolicy;
use crate::record::FlatRecord;
use crate::strategy::{format_decimal, LeafKind, LeafStrategy};

mod accessors;
pub mod timeseries;
mod units;

pub use timeseries::{flatten_entry, flatten_time_series, FieldSource};
pub use units::output_unit;

use accessors::read;

/// Flatten one entity into a record (`uuid` first, the rest by name).
///
/// The entity is only read. Any accessor or format failure fails the whole
/// record.
pub fn flatten(entity: &Entity) -> MappingResult<FlatRecord> {
    let fields = match entity {
        Entity::Operator(e) => read(accessors::OPERATOR, e),
        Entity::VoltageLevel(e) => read(accessors::VOLTAGE_LEVEL, e),
        Entity::Node(e) => read(accessors::NODE, e),
        Entity::LineType(e) => read(accessors::LINE_TYPE, e),
        Entity::Line(e) => read(accessors::LINE, e),
        Entity::LineGraphic(e) => read(accessors::LINE_GRAPHIC, e),
        Entity::Load(e) => read(accessors::LOAD, e),
        Entity::EnergyManager(e) => read(accessors::ENERGY_MANAGER, e),
        Entity::ChpType(e) => read(accessors::CHP_TYPE, e),
        Entity::Chp(e) => read(accessors::CHP, e),
        Entity::ThermalBus(e) => read(accessors::THERMAL_BUS, e),
        Entity::CylindricalStorage(e) => read(accessors::CYLINDRICAL_STORAGE, e),
        Entity::NodeResult(e) => read(accessors::NODE_RESULT, e),
        Entity::LoadResult(e) => read(accessors::LOAD_RESULT, e),
        Entity::Irradiance(e) => read(accessors::IRRADIANCE, e),
        Entity::Temperature(e) => read(accessors::TEMPERATURE, e),
        Entity::Wind(e) => read(accessors::WIND, e),
        Entity::TimeBasedValue(e) => return flatten_entry(e),
    };

    let kind = entity.kind();
    let mut map = BTreeMap::new();
    for (field, value) in fields {
        map.insert(field.to_string(), stringify(kind, field, &value)?);
    }
    Ok(FlatRecord::from_map(map))
}

/// Express a quantity field in its declared output unit.
pub fn normalize(kind: EntityKind, field: &str, quantity: Quantity) -> MappingResult<Quantity> {
    let unit = output_unit(kind, field).ok_or_else(|| MappingError::UnrecognizedQuantityField {
        entity: kind,
        field: field.to_string(),
        value: quantity.to_string(),
    })?;
    quantity.to(unit).map_err(|e| MappingError::Flatten {
        entity: kind,
        field: field.to_string(),
        value: quantity.to_string(),
        reason: e.to_string(),
    })
}

/// Output text of one field value.
///
/// References are written as the referenced uuid; the unassigned operator is
/// written as empty text.
pub(crate) fn stringify(kind: EntityKind, field: &str, value: &Value) -> MappingResult<String> {
    let failed = |reason: String| MappingError::Flatten {
        entity: kind,
        field: field.to_string(),
        value: value.to_string(),
        reason,
    };

    match value {
        Value::Null => Ok(String::new()),
        Value::Quantity(q) => {
            let normalized = normalize(kind, field, *q)?;
            format_decimal(normalized.value()).ok_or_else(|| failed("not a finite number".into()))
        }
        Value::Entity(Entity::Operator(op)) if op.is_unassigned() => Ok(String::new()),
        Value::Entity(referenced) => referenced
            .uuid()
            .map(|u| u.hyphenated().to_string())
            .ok_or_else(|| failed(format!("a {} cannot be referenced", referenced.kind()))),
        leaf => {
            let leaf_kind = LeafKind::of_value(leaf)
                .ok_or_else(|| failed(format!("no encoder for {}", leaf.type_name())))?;
            LeafStrategy::new(leaf_kind, BooleanPolicy::Strict)
                .encode(leaf)
                .map_err(|e| failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmap_core::input::{no_operator_assigned, OperationTime, OperatorInput, ThermalBusInput};
    use gridmap_core::units::Unit;
    use uuid::Uuid;

    #[test]
    fn test_normalize_converts_into_declared_unit() {
        let q = normalize(
            EntityKind::LoadResult,
            "p",
            Quantity::new(250.0, Unit::Kilowatt),
        )
        .unwrap();
        assert_eq!(q.unit(), Unit::Megawatt);
        assert!((q.value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_rejects_undeclared_pair() {
        let err = normalize(EntityKind::Node, "p", Quantity::new(1.0, Unit::Kilowatt)).unwrap_err();
        assert_eq!(err.code(), "unrecognized-quantity-field");
        assert!(err.to_string().contains("NodeInput.p"));
    }

    #[test]
    fn test_normalize_rejects_wrong_family() {
        let err = normalize(EntityKind::Line, "length", Quantity::new(1.0, Unit::Volt)).unwrap_err();
        assert_eq!(err.code(), "flatten");
    }

    #[test]
    fn test_references_and_sentinel() {
        let sentinel = Value::Entity(Entity::Operator(no_operator_assigned()));
        assert_eq!(stringify(EntityKind::Node, "operator", &sentinel).unwrap(), "");

        let uuid = Uuid::new_v4();
        let op = Value::Entity(OperatorInput::new(uuid, "DSO").unwrap().into());
        assert_eq!(
            stringify(EntityKind::Node, "operator", &op).unwrap(),
            uuid.hyphenated().to_string()
        );
    }

    #[test]
    fn test_flatten_orders_uuid_first() {
        let bus = ThermalBusInput::new(
            Uuid::new_v4(),
            "bus 1",
            no_operator_assigned(),
            OperationTime::not_limited(),
        );
        let flat = flatten(&bus.clone().into()).unwrap();
        assert_eq!(
            flat.header(),
            vec!["uuid", "id", "operatesfrom", "operatesuntil", "operator"]
        );
        assert_eq!(flat.get("uuid").unwrap(), bus.uuid.to_string());
        assert_eq!(flat.get("operator"), Some(""));
    }

    #[test]
    fn test_non_finite_quantity_fails_whole_record() {
        let err = stringify(
            EntityKind::Line,
            "length",
            &Value::Quantity(Quantity::new(f64::NAN, Unit::Kilometre)),
        )
        .unwrap_err();
        match err {
            MappingError::Flatten { entity, field, .. } => {
                assert_eq!(entity, EntityKind::Line);
                assert_eq!(field, "length");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
