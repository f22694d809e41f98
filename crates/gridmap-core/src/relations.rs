//! Relation tags: the named references an entity exposes to other entities.
//!
//! The dependency extractor consumes only this module. Each entity kind
//! declares a fixed set of [`RelationKind`]s ([`EntityKind::relation_kinds`]),
//! and [`Entity::relations`] returns the concrete [`Relation`]s for an
//! instance, in the same order.

use std::sync::Arc;

use crate::input::{
    CylindricalStorageInput, EmInput, LineInput, NodeInput, OperatorInput, ThermalBusInput,
};
use crate::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    Nodes,
    Type,
    Operator,
    ThermalBus,
    ThermalStorage,
    Line,
    EnergyManager,
}

impl RelationKind {
    pub fn name(self) -> &'static str {
        match self {
            RelationKind::Nodes => "has-nodes",
            RelationKind::Type => "has-type",
            RelationKind::Operator => "has-operator",
            RelationKind::ThermalBus => "has-thermal-bus",
            RelationKind::ThermalStorage => "has-thermal-storage",
            RelationKind::Line => "has-line",
            RelationKind::EnergyManager => "has-energy-manager",
        }
    }

    /// Whether the relation may legitimately yield nothing (the unassigned
    /// operator, or no energy manager).
    pub fn is_optional(self) -> bool {
        matches!(self, RelationKind::Operator | RelationKind::EnergyManager)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A relation of one entity instance, carrying the related entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Nodes(Vec<Arc<NodeInput>>),
    /// The asset type (line type, CHP type)
    Type(Entity),
    /// May be the unassigned-operator placeholder
    Operator(Arc<OperatorInput>),
    ThermalBus(Arc<ThermalBusInput>),
    ThermalStorage(Arc<CylindricalStorageInput>),
    Line(Arc<LineInput>),
    EnergyManager(Option<Arc<EmInput>>),
}

impl Relation {
    pub fn kind(&self) -> RelationKind {
        match self {
            Relation::Nodes(_) => RelationKind::Nodes,
            Relation::Type(_) => RelationKind::Type,
            Relation::Operator(_) => RelationKind::Operator,
            Relation::ThermalBus(_) => RelationKind::ThermalBus,
            Relation::ThermalStorage(_) => RelationKind::ThermalStorage,
            Relation::Line(_) => RelationKind::Line,
            Relation::EnergyManager(_) => RelationKind::EnergyManager,
        }
    }

    /// Related entities that need to be persisted on their own.
    ///
    /// The unassigned operator and an absent energy manager contribute nothing.
    pub fn persistable(&self) -> Vec<Entity> {
        match self {
            Relation::Nodes(nodes) => nodes.iter().cloned().map(Entity::Node).collect(),
            Relation::Type(entity) => vec![entity.clone()],
            Relation::Operator(op) if op.is_unassigned() => Vec::new(),
            Relation::Operator(op) => vec![Entity::Operator(Arc::clone(op))],
            Relation::ThermalBus(bus) => vec![Entity::ThermalBus(Arc::clone(bus))],
            Relation::ThermalStorage(storage) => {
                vec![Entity::CylindricalStorage(Arc::clone(storage))]
            }
            Relation::Line(line) => vec![Entity::Line(Arc::clone(line))],
            Relation::EnergyManager(em) => em.iter().cloned().map(Entity::EnergyManager).collect(),
        }
    }
}

impl EntityKind {
    /// Relation tags exposed by entities of this kind.
    pub fn relation_kinds(self) -> &'static [RelationKind] {
        use RelationKind::*;
        match self {
            EntityKind::Node | EntityKind::ThermalBus => &[Operator],
            EntityKind::Line => &[Nodes, Type, Operator],
            EntityKind::LineGraphic => &[Line],
            EntityKind::Load => &[Nodes, Operator, EnergyManager],
            EntityKind::EnergyManager => &[Operator, EnergyManager],
            EntityKind::Chp => &[
                Nodes,
                Type,
                Operator,
                ThermalBus,
                ThermalStorage,
                EnergyManager,
            ],
            EntityKind::CylindricalStorage => &[Operator, ThermalBus],
            EntityKind::Operator
            | EntityKind::VoltageLevel
            | EntityKind::LineType
            | EntityKind::ChpType
            | EntityKind::NodeResult
            | EntityKind::LoadResult
            | EntityKind::TimeBasedValue
            | EntityKind::Irradiance
            | EntityKind::Temperature
            | EntityKind::Wind => &[],
        }
    }
}

impl Entity {
    /// Concrete relations, in the order of [`EntityKind::relation_kinds`].
    pub fn relations(&self) -> Vec<Relation> {
        match self {
            Entity::Node(n) => vec![Relation::Operator(Arc::clone(&n.operator))],
            Entity::Line(l) => vec![
                Relation::Nodes(vec![Arc::clone(&l.node_a), Arc::clone(&l.node_b)]),
                Relation::Type(Entity::LineType(Arc::clone(&l.line_type))),
                Relation::Operator(Arc::clone(&l.operator)),
            ],
            Entity::LineGraphic(g) => vec![Relation::Line(Arc::clone(&g.line))],
            Entity::Load(l) => vec![
                Relation::Nodes(vec![Arc::clone(&l.node)]),
                Relation::Operator(Arc::clone(&l.operator)),
                Relation::EnergyManager(l.em.clone()),
            ],
            Entity::EnergyManager(em) => vec![
                Relation::Operator(Arc::clone(&em.operator)),
                Relation::EnergyManager(em.parent_em.clone()),
            ],
            Entity::Chp(c) => vec![
                Relation::Nodes(vec![Arc::clone(&c.node)]),
                Relation::Type(Entity::ChpType(Arc::clone(&c.chp_type))),
                Relation::Operator(Arc::clone(&c.operator)),
                Relation::ThermalBus(Arc::clone(&c.thermal_bus)),
                Relation::ThermalStorage(Arc::clone(&c.thermal_storage)),
                Relation::EnergyManager(c.em.clone()),
            ],
            Entity::ThermalBus(b) => vec![Relation::Operator(Arc::clone(&b.operator))],
            Entity::CylindricalStorage(s) => vec![
                Relation::Operator(Arc::clone(&s.operator)),
                Relation::ThermalBus(Arc::clone(&s.thermal_bus)),
            ],
            Entity::Operator(_)
            | Entity::VoltageLevel(_)
            | Entity::LineType(_)
            | Entity::ChpType(_)
            | Entity::NodeResult(_)
            | Entity::LoadResult(_)
            | Entity::TimeBasedValue(_)
            | Entity::Irradiance(_)
            | Entity::Temperature(_)
            | Entity::Wind(_) => Vec::new(),
        }
    }
}
