//! Generic entity construction from a field record and its catalog entry.

use gridmap_core::{Entity, MappingError, MappingResult, Value};
use tracing::debug;

use crate::catalog::{Args, EntityCatalog, ParamKind};
use crate::record::{FieldRecord, ResolvedContext};
use crate::strategy::{StrategyRegistry, TargetType};

/// Build one entity.
///
/// Every catalog parameter gets an argument, in catalog order:
/// - parameters the selected signature does not bind are null
/// - a context entry under the parameter name always wins
/// - direct parameters decode their one field; an absent field is null
/// - nested parameters decode the sub-record of their field group through
///   the registry, with the matching context entries
/// - external parameters only ever come from the context
///
/// Fields no parameter consumes are ignored. Parsing failures in a field
/// propagate as they are; a builder failure becomes
/// [`MappingError::Construction`] carrying the rendered arguments.
pub fn construct(
    registry: &StrategyRegistry,
    catalog: &EntityCatalog,
    record: &FieldRecord,
    ctx: &ResolvedContext,
) -> MappingResult<Entity> {
    let signature = catalog.select(record, ctx)?;

    let mut values = Vec::with_capacity(catalog.params().len());
    for param in catalog.params() {
        let name = param.name();
        let value = if !signature.binds(name) {
            Value::Null
        } else if let Some(resolved) = ctx.get(name) {
            resolved.clone()
        } else {
            match param.kind() {
                ParamKind::Direct(leaf) => match record.get(name) {
                    Some(raw) => registry.decode_field(*leaf, raw)?,
                    None => Value::Null,
                },
                ParamKind::Nested { target, fields } => {
                    let sub_record = record.subset(fields);
                    let sub_ctx = ctx.subset(fields);
                    if sub_record.is_empty() && sub_ctx.is_empty() {
                        Value::Null
                    } else {
                        registry.decode(TargetType::Entity(*target), &sub_record, &sub_ctx)?
                    }
                }
                ParamKind::External(_) => Value::Null,
            }
        };
        values.push((name, value));
    }

    let args = Args::new(catalog.kind(), values);
    signature.build(&args).map_err(|e| {
        debug!(
            entity = %catalog.kind(),
            signature = signature.name(),
            "construction failed: {e:#}"
        );
        MappingError::Construction {
            entity: catalog.kind(),
            reason: format!("{e:#}"),
            args: args.describe(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmap_core::units::{Quantity, Unit};
    use gridmap_core::EntityKind;

    fn node_record() -> FieldRecord {
        [
            ("uuid", "3e6be3ac-2b51-4080-b815-391313612fc7"),
            ("id", "Node 1"),
            ("vtarget", "1.0"),
            ("vrated", "110.0"),
            ("slack", "true"),
            ("subnet", "3"),
            ("voltlvl", "hv"),
        ]
        .into_iter()
        .collect()
    }

    fn node_catalog() -> std::sync::Arc<EntityCatalog> {
        StrategyRegistry::global()
            .catalog_for(EntityKind::Node)
            .unwrap()
    }

    #[test]
    fn test_nested_voltage_level() {
        let registry = StrategyRegistry::global();
        let entity = construct(registry, &node_catalog(), &node_record(), &ResolvedContext::new())
            .unwrap();
        let node = entity.as_node().unwrap();
        assert_eq!(node.volt_lvl.id, "hv");
        assert_eq!(
            node.volt_lvl.nominal_voltage,
            Quantity::new(110.0, Unit::Kilovolt)
        );
        assert!(node.operator.is_unassigned());
        assert_eq!(node.geo_position, None);
    }

    #[test]
    fn test_context_overrides_field() {
        let registry = StrategyRegistry::global();
        let ctx = ResolvedContext::new().with("id", "from context");
        let entity = construct(registry, &node_catalog(), &node_record(), &ctx).unwrap();
        assert_eq!(entity.label(), "from context");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let registry = StrategyRegistry::global();
        let record = node_record().with("colour", "red");
        assert!(construct(registry, &node_catalog(), &record, &ResolvedContext::new()).is_ok());
    }

    #[test]
    fn test_domain_violation_is_construction_error() {
        let registry = StrategyRegistry::global();
        let record = node_record().with("subnet", "-1");
        let err = construct(registry, &node_catalog(), &record, &ResolvedContext::new())
            .unwrap_err();
        match err {
            MappingError::Construction { entity, args, .. } => {
                assert_eq!(entity, EntityKind::Node);
                assert_eq!(args["subnet"], "-1");
                assert_eq!(args["operator"], "null");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_malformed_field_is_parsing_error() {
        let registry = StrategyRegistry::global();
        let record = node_record().with("slack", "maybe");
        let err = construct(registry, &node_catalog(), &record, &ResolvedContext::new())
            .unwrap_err();
        assert_eq!(err.code(), "parsing");
    }
}
