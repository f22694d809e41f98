//! Already-decoded entities, looked up by uuid to resolve references.

use std::collections::HashMap;

use gridmap_core::{Entity, EntityKind, MappingError, MappingResult};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::{EntityCatalog, ParamKind};
use crate::record::{FieldRecord, ResolvedContext};

/// A reference the index could not resolve and that decoding replaced with
/// a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Field holding the reference
    pub field: &'static str,
    pub uuid: Uuid,
    /// What the reference was replaced with
    pub replacement: &'static str,
}

impl std::fmt::Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown {} {}, using {}",
            self.field, self.uuid, self.replacement
        )
    }
}

/// Resolved context of one record plus the references that were substituted.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub context: ResolvedContext,
    pub substitutions: Vec<Substitution>,
}

/// Entities by uuid, used to build the resolved context of records that
/// reference them.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    entities: HashMap<Uuid, Entity>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Value objects without a uuid are not indexed.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        let uuid = entity.uuid()?;
        self.entities.insert(uuid, entity)
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&Entity> {
        self.entities.get(uuid)
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.entities.contains_key(uuid)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve the external parameters of `catalog` for one record.
    ///
    /// Blank references are skipped. A malformed uuid, or one that names an
    /// entity of another kind, is a parsing failure. Unknown operators are
    /// left out so the asset falls back to the unassigned operator; any other
    /// unknown reference is left out and fails in construction.
    pub fn resolve_for(
        &self,
        catalog: &EntityCatalog,
        record: &FieldRecord,
    ) -> MappingResult<ResolvedContext> {
        self.resolve(catalog, record).map(|r| r.context)
    }

    /// Like [`resolve_for`](Self::resolve_for), also reporting every unknown
    /// operator that was replaced by the unassigned one.
    pub fn resolve(&self, catalog: &EntityCatalog, record: &FieldRecord) -> MappingResult<Resolution> {
        let mut resolution = Resolution::default();
        let ctx = &mut resolution.context;
        for param in catalog.params() {
            let ParamKind::External(kind) = *param.kind() else {
                continue;
            };
            let Some(raw) = record.get(param.name()).map(str::trim) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }

            let uuid = Uuid::parse_str(raw)
                .map_err(|e| MappingError::parsing(kind.name(), raw, e))?;
            match self.entities.get(&uuid) {
                Some(entity) if entity.kind() == kind => {
                    ctx.insert(param.name(), entity.clone());
                }
                Some(entity) => {
                    return Err(MappingError::parsing(
                        kind.name(),
                        raw,
                        format!("'{}' references a {}", param.name(), entity.kind()),
                    ));
                }
                None if kind == EntityKind::Operator => {
                    warn!(
                        entity = %catalog.kind(),
                        %uuid,
                        "unknown operator, falling back to no operator assigned"
                    );
                    resolution.substitutions.push(Substitution {
                        field: param.name(),
                        uuid,
                        replacement: "no operator assigned",
                    });
                }
                None => {
                    debug!(entity = %catalog.kind(), field = param.name(), %uuid, "unresolved reference");
                }
            }
        }
        Ok(resolution)
    }
}

impl Extend<Entity> for ReferenceIndex {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl FromIterator<Entity> for ReferenceIndex {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut index = ReferenceIndex::new();
        index.extend(iter);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyRegistry;
    use gridmap_core::input::OperatorInput;

    fn operator() -> Entity {
        OperatorInput::new(Uuid::new_v4(), "TSO").unwrap().into()
    }

    #[test]
    fn test_value_objects_are_not_indexed() {
        use gridmap_core::input::VoltageLevel;
        use gridmap_core::units::{Quantity, Unit};

        let mut index = ReferenceIndex::new();
        index.insert(VoltageLevel::new("hv", Quantity::new(110.0, Unit::Kilovolt)).unwrap().into());
        assert!(index.is_empty());
        index.insert(operator());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_resolves_external_references() {
        let op = operator();
        let index: ReferenceIndex = [op.clone()].into_iter().collect();
        let catalog = StrategyRegistry::global()
            .catalog_for(EntityKind::ThermalBus)
            .unwrap();

        let record = FieldRecord::new()
            .with("id", "bus")
            .with("operator", op.uuid().unwrap().to_string());
        let ctx = index.resolve_for(&catalog, &record).unwrap();
        assert!(ctx.get("operator").unwrap().as_entity().unwrap().ptr_eq(&op));
        // direct fields are not touched
        assert!(!ctx.contains("id"));
    }

    #[test]
    fn test_unknown_and_blank_references_are_left_out() {
        let index = ReferenceIndex::new();
        let catalog = StrategyRegistry::global()
            .catalog_for(EntityKind::Line)
            .unwrap();
        let operator = Uuid::new_v4();
        let record = FieldRecord::new()
            .with("operator", operator.to_string())
            .with("nodea", Uuid::new_v4().to_string())
            .with("nodeb", "");
        let resolution = index.resolve(&catalog, &record).unwrap();
        assert!(resolution.context.is_empty());

        // only the operator has a fallback
        assert_eq!(
            resolution.substitutions,
            vec![Substitution {
                field: "operator",
                uuid: operator,
                replacement: "no operator assigned",
            }]
        );
        assert!(resolution.substitutions[0]
            .to_string()
            .starts_with("unknown operator "));
    }

    #[test]
    fn test_bad_references_fail() {
        let op = operator();
        let index: ReferenceIndex = [op.clone()].into_iter().collect();
        let catalog = StrategyRegistry::global()
            .catalog_for(EntityKind::Line)
            .unwrap();

        let malformed = FieldRecord::new().with("nodea", "node-1");
        assert_eq!(index.resolve_for(&catalog, &malformed).unwrap_err().code(), "parsing");

        let wrong_kind = FieldRecord::new().with("nodea", op.uuid().unwrap().to_string());
        let err = index.resolve_for(&catalog, &wrong_kind).unwrap_err();
        assert!(err.to_string().contains("OperatorInput"));
    }
}
