use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind, MappingError, MappingResult, Value};
use once_cell::sync::Lazy;
use tracing::debug;

use super::{CompositeStrategy, LeafKind, LeafStrategy, Strategy, TargetType};
use crate::catalog::{BuiltinCatalog, EntityCatalog, FieldCatalogSource, ParamKind};
use crate::config::DecodeConfig;
use crate::record::{FieldRecord, ResolvedContext};

static GLOBAL: Lazy<StrategyRegistry> =
    Lazy::new(|| StrategyRegistry::with_builtin_catalog(DecodeConfig::default()));

/// Cache from target type to its strategy.
///
/// Leaf strategies are installed up front. Composite strategies are derived
/// from the field catalog on first use and never removed; concurrent first
/// use of a kind still installs exactly one instance.
pub struct StrategyRegistry {
    strategies: DashMap<TargetType, Arc<Strategy>>,
    catalogs: Arc<dyn FieldCatalogSource>,
    config: DecodeConfig,
}

impl StrategyRegistry {
    pub fn new(catalogs: Arc<dyn FieldCatalogSource>, config: DecodeConfig) -> Self {
        let strategies = DashMap::new();
        let leaves = LeafKind::BASIC
            .iter()
            .copied()
            .chain(Unit::ALL.iter().map(|u| LeafKind::Quantity(*u)));
        for kind in leaves {
            let leaf = LeafStrategy::new(kind, config.boolean_policy);
            strategies.insert(TargetType::Leaf(kind), Arc::new(Strategy::Leaf(leaf)));
        }

        Self {
            strategies,
            catalogs,
            config,
        }
    }

    pub fn with_builtin_catalog(config: DecodeConfig) -> Self {
        Self::new(Arc::new(BuiltinCatalog), config)
    }

    /// Process-wide registry over the built-in catalog with default settings.
    pub fn global() -> &'static StrategyRegistry {
        &GLOBAL
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Look up the strategy for a target, deriving a composite one if needed.
    pub fn resolve(&self, target: TargetType) -> MappingResult<Arc<Strategy>> {
        if let Some(found) = self.strategies.get(&target) {
            return Ok(Arc::clone(found.value()));
        }

        let missing = || MappingError::MissingStrategy {
            target: target.to_string(),
        };
        let TargetType::Entity(kind) = target else {
            return Err(missing());
        };
        let catalog = self.catalogs.catalog(kind).ok_or_else(missing)?;

        let entry = self.strategies.entry(target).or_insert_with(|| {
            debug!(entity = %kind, "registering composite strategy");
            Arc::new(Strategy::Composite(CompositeStrategy::new(catalog)))
        });
        Ok(Arc::clone(entry.value()))
    }

    /// Install a strategy unless its target already has one. Returns the
    /// instance that ends up registered.
    pub fn register(&self, strategy: Strategy) -> Arc<Strategy> {
        let target = strategy.target();
        let entry = self.strategies.entry(target).or_insert_with(|| {
            debug!(%target, "registering strategy");
            Arc::new(strategy)
        });
        Arc::clone(entry.value())
    }

    pub fn is_registered(&self, target: TargetType) -> bool {
        self.strategies.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Decode a record into a value of `target`.
    ///
    /// A context entry under the kind's reference key that already holds an
    /// entity of that kind is returned as is, without decoding.
    pub fn decode(
        &self,
        target: TargetType,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<Value> {
        if let TargetType::Entity(kind) = target {
            if let Some(Value::Entity(entity)) = ctx.get(kind.key()) {
                if entity.kind() == kind {
                    return Ok(Value::Entity(entity.clone()));
                }
            }
        }
        self.resolve(target)?.decode(self, record, ctx)
    }

    pub fn decode_entity(
        &self,
        kind: EntityKind,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<Entity> {
        match self.decode(kind.into(), record, ctx)? {
            Value::Entity(entity) => Ok(entity),
            other => Err(MappingError::Construction {
                entity: kind,
                reason: format!("decoded a {} instead of an entity", other.type_name()),
                args: BTreeMap::new(),
            }),
        }
    }

    /// Decode a single raw field.
    pub fn decode_field(&self, kind: LeafKind, raw: &str) -> MappingResult<Value> {
        match &*self.resolve(kind.into())? {
            Strategy::Leaf(leaf) => leaf.decode_text(raw),
            Strategy::Composite(_) => Err(MappingError::MissingStrategy {
                target: kind.to_string(),
            }),
        }
    }

    pub fn catalog_for(&self, kind: EntityKind) -> MappingResult<Arc<EntityCatalog>> {
        match &*self.resolve(kind.into())? {
            Strategy::Composite(composite) => Ok(Arc::clone(composite.catalog())),
            Strategy::Leaf(_) => Err(MappingError::MissingStrategy {
                target: kind.to_string(),
            }),
        }
    }

    /// Resolve and validate the strategy tree of `kinds` ahead of decoding, so
    /// configuration errors surface before the first row.
    pub fn prepare(&self, kinds: &[EntityKind]) -> MappingResult<()> {
        let mut visited = HashSet::new();
        let mut pending = kinds.to_vec();
        while let Some(kind) = pending.pop() {
            if !visited.insert(kind) {
                continue;
            }
            let catalog = self.catalog_for(kind)?;
            catalog.validate()?;
            for param in catalog.params() {
                match param.kind() {
                    ParamKind::Nested { target, .. } => pending.push(*target),
                    ParamKind::Direct(leaf) => {
                        self.resolve((*leaf).into())?;
                    }
                    ParamKind::External(_) => {}
                }
            }
        }
        debug!(kinds = visited.len(), "prepared strategy tree");
        Ok(())
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.strategies.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanPolicy;

    /// Catalog source that only knows nodes and their voltage levels.
    struct NodesOnly;

    impl FieldCatalogSource for NodesOnly {
        fn catalog(&self, kind: EntityKind) -> Option<Arc<EntityCatalog>> {
            match kind {
                EntityKind::Node | EntityKind::VoltageLevel => BuiltinCatalog.catalog(kind),
                _ => None,
            }
        }
    }

    #[test]
    fn test_leaves_are_preinstalled() {
        let registry = StrategyRegistry::with_builtin_catalog(DecodeConfig::default());
        assert_eq!(registry.len(), LeafKind::BASIC.len() + Unit::ALL.len());
        assert!(registry.is_registered(LeafKind::Boolean.into()));
        assert!(registry.is_registered(LeafKind::Quantity(Unit::Kilovolt).into()));
        assert!(!registry.is_registered(EntityKind::Node.into()));
    }

    #[test]
    fn test_resolve_is_stable() {
        let registry = StrategyRegistry::with_builtin_catalog(DecodeConfig::default());
        let a = registry.resolve(EntityKind::Node.into()).unwrap();
        let b = registry.resolve(EntityKind::Node.into()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.is_registered(EntityKind::Node.into()));
    }

    #[test]
    fn test_missing_strategy_is_configuration_error() {
        let registry = StrategyRegistry::new(Arc::new(NodesOnly), DecodeConfig::default());
        assert!(registry.resolve(EntityKind::Node.into()).is_ok());

        let err = registry.resolve(EntityKind::Line.into()).unwrap_err();
        assert_eq!(err.code(), "missing-strategy");
        assert!(err.is_configuration());
        assert!(registry.prepare(&[EntityKind::Line]).is_err());
        assert!(registry.prepare(&[EntityKind::Node]).is_ok());
    }

    #[test]
    fn test_register_if_absent() {
        let registry = StrategyRegistry::with_builtin_catalog(DecodeConfig::default());
        let installed = registry.resolve(LeafKind::Boolean.into()).unwrap();
        let lenient = LeafStrategy::new(LeafKind::Boolean, BooleanPolicy::Lenient);
        let kept = registry.register(Strategy::Leaf(lenient));
        assert!(Arc::ptr_eq(&installed, &kept));
    }

    #[test]
    fn test_context_entity_short_circuits_decode() {
        let registry = StrategyRegistry::global();
        let level = registry
            .decode_entity(
                EntityKind::VoltageLevel,
                &FieldRecord::new().with("voltlvl", "mv").with("vrated", "20"),
                &ResolvedContext::new(),
            )
            .unwrap();

        // the record is malformed; the context entry wins anyway
        let ctx = ResolvedContext::new().with("voltlvl", level.clone());
        let decoded = registry
            .decode_entity(
                EntityKind::VoltageLevel,
                &FieldRecord::new().with("vrated", "garbage"),
                &ctx,
            )
            .unwrap();
        assert!(decoded.ptr_eq(&level));
    }

    #[test]
    fn test_lenient_booleans_follow_config() {
        let config = DecodeConfig {
            boolean_policy: BooleanPolicy::Lenient,
        };
        let registry = StrategyRegistry::with_builtin_catalog(config);
        assert_eq!(
            registry.decode_field(LeafKind::Boolean, "yes").unwrap(),
            Value::Bool(false)
        );
        assert!(StrategyRegistry::global()
            .decode_field(LeafKind::Boolean, "yes")
            .is_err());
    }
}
