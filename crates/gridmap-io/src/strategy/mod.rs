//! Strategies convert between field records and typed values.
//!
//! A strategy is either a [`LeafStrategy`] (one textual value to one leaf
//! value, and back) or a [`CompositeStrategy`] (a whole record to an entity,
//! built by the composite constructor). The [`StrategyRegistry`] caches
//! exactly one strategy per [`TargetType`].

use std::sync::Arc;

use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind, MappingResult, Value};

use crate::catalog::EntityCatalog;
use crate::constructor;
use crate::record::{FieldRecord, ResolvedContext};

mod leaf;
mod registry;

pub use leaf::{format_decimal, LeafStrategy};
pub use registry::StrategyRegistry;

/// Kinds of single textual values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Text,
    Boolean,
    Integer,
    Uuid,
    Timestamp,
    GeoPoint,
    /// A physical quantity, held in the given unit
    Quantity(Unit),
}

impl LeafKind {
    /// Leaf kinds other than quantities.
    pub const BASIC: &'static [LeafKind] = &[
        LeafKind::Text,
        LeafKind::Boolean,
        LeafKind::Integer,
        LeafKind::Uuid,
        LeafKind::Timestamp,
        LeafKind::GeoPoint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LeafKind::Text => "string",
            LeafKind::Boolean => "boolean",
            LeafKind::Integer => "integer",
            LeafKind::Uuid => "uuid",
            LeafKind::Timestamp => "timestamp",
            LeafKind::GeoPoint => "geo-point",
            LeafKind::Quantity(_) => "quantity",
        }
    }

    /// Leaf kind able to encode `value`. None for null and entities.
    pub fn of_value(value: &Value) -> Option<LeafKind> {
        match value {
            Value::Text(_) => Some(LeafKind::Text),
            Value::Bool(_) => Some(LeafKind::Boolean),
            Value::Int(_) => Some(LeafKind::Integer),
            Value::Uuid(_) => Some(LeafKind::Uuid),
            Value::Timestamp(_) => Some(LeafKind::Timestamp),
            Value::GeoPoint(_) => Some(LeafKind::GeoPoint),
            Value::Quantity(q) => Some(LeafKind::Quantity(q.unit())),
            Value::Null | Value::Entity(_) => None,
        }
    }

    /// Whether empty text is a value of its own rather than an absent one.
    pub fn accepts_empty(self) -> bool {
        matches!(self, LeafKind::Text | LeafKind::GeoPoint)
    }
}

impl std::fmt::Display for LeafKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafKind::Quantity(unit) => write!(f, "quantity [{unit}]"),
            other => f.write_str(other.name()),
        }
    }
}

/// What a strategy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Leaf(LeafKind),
    Entity(EntityKind),
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::Leaf(kind) => write!(f, "{kind}"),
            TargetType::Entity(kind) => write!(f, "{kind}"),
        }
    }
}

impl From<LeafKind> for TargetType {
    fn from(kind: LeafKind) -> Self {
        TargetType::Leaf(kind)
    }
}

impl From<EntityKind> for TargetType {
    fn from(kind: EntityKind) -> Self {
        TargetType::Entity(kind)
    }
}

/// Builds one entity kind from a record through its field catalog.
#[derive(Debug)]
pub struct CompositeStrategy {
    catalog: Arc<EntityCatalog>,
}

impl CompositeStrategy {
    pub fn new(catalog: Arc<EntityCatalog>) -> Self {
        Self { catalog }
    }

    pub fn kind(&self) -> EntityKind {
        self.catalog.kind()
    }

    pub fn catalog(&self) -> &Arc<EntityCatalog> {
        &self.catalog
    }

    pub fn decode(
        &self,
        registry: &StrategyRegistry,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<Entity> {
        constructor::construct(registry, &self.catalog, record, ctx)
    }
}

#[derive(Debug)]
pub enum Strategy {
    Leaf(LeafStrategy),
    Composite(CompositeStrategy),
}

impl Strategy {
    pub fn target(&self) -> TargetType {
        match self {
            Strategy::Leaf(leaf) => TargetType::Leaf(leaf.kind()),
            Strategy::Composite(composite) => TargetType::Entity(composite.kind()),
        }
    }

    /// Decode a record. Leaves pick their one relevant field.
    pub fn decode(
        &self,
        registry: &StrategyRegistry,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<Value> {
        match self {
            Strategy::Leaf(leaf) => leaf.decode_record(record, ctx),
            Strategy::Composite(composite) => {
                composite.decode(registry, record, ctx).map(Value::Entity)
            }
        }
    }
}
