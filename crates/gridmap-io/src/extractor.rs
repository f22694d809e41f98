//! Dependency extraction: the transitive closure of an entity's relations.
//!
//! Relations are read through [`RelationAccess`]; the default
//! [`DomainRelations`] uses the relation tags of the domain model. Every
//! entity discovered directly from the root starts its own branch, and with
//! `extract.parallel` each branch runs on the rayon pool. A branch that fails
//! is logged and dropped while its siblings still contribute.
//!
//! ```ignore
//! let extraction = Extractor::new(ExtractConfig::default()).extract(&line)?;
//! for entity in extraction.persistence_order()? {
//!     sink.write(&flatten(&entity)?)?;
//! }
//! ```

use std::collections::HashSet;

use gridmap_core::{Entity, EntityKey, EntityKind, MappingError, MappingResult, Relation, RelationKind};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ExtractConfig;

/// Access to the relations an entity exposes.
pub trait RelationAccess: Send + Sync {
    /// Relation tags declared for a kind.
    fn relation_kinds(&self, kind: EntityKind) -> &'static [RelationKind];

    /// Concrete relations of one entity.
    fn relations(&self, entity: &Entity) -> MappingResult<Vec<Relation>>;
}

/// Relations as declared by the domain model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainRelations;

impl RelationAccess for DomainRelations {
    fn relation_kinds(&self, kind: EntityKind) -> &'static [RelationKind] {
        kind.relation_kinds()
    }

    fn relations(&self, entity: &Entity) -> MappingResult<Vec<Relation>> {
        Ok(entity.relations())
    }
}

/// A branch whose walk failed.
#[derive(Debug)]
pub struct BranchFailure {
    /// Directly discovered entity the branch started from
    pub entity: Entity,
    pub error: MappingError,
}

/// Entities reachable from a root, without the root itself.
#[derive(Debug)]
pub struct Extraction {
    root: Entity,
    entities: Vec<Entity>,
    /// (dependency, dependent)
    edges: Vec<(EntityKey, EntityKey)>,
    failures: Vec<BranchFailure>,
}

impl Extraction {
    pub fn root(&self) -> &Entity {
        &self.root
    }

    /// Extracted entities in discovery order, each once.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn edges(&self) -> &[(EntityKey, EntityKey)] {
        &self.edges
    }

    pub fn failures(&self) -> &[BranchFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        match entity.key() {
            Some(key) => self.entities.iter().any(|e| e.key() == Some(key)),
            None => self.entities.iter().any(|e| e.ptr_eq(entity)),
        }
    }

    /// Whether every branch was walked.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Extracted entities ordered for write-back, dependencies first.
    pub fn persistence_order(&self) -> MappingResult<Vec<Entity>> {
        let mut graph: DiGraphMap<EntityKey, ()> = DiGraphMap::new();
        for key in self.entities.iter().filter_map(Entity::key) {
            graph.add_node(key);
        }
        for (dependency, dependent) in &self.edges {
            graph.add_edge(*dependency, *dependent, ());
        }

        let sorted = toposort(&graph, None).map_err(|cycle| {
            MappingError::ExtractionConfiguration {
                entity: describe(&self.root),
                reason: format!("relations form a cycle through {}", cycle.node_id()),
            }
        })?;

        let root = self.root.key();
        let mut ordered: Vec<Entity> = self
            .entities
            .iter()
            .filter(|e| e.key().is_none())
            .cloned()
            .collect();
        for key in sorted.into_iter().filter(|k| Some(*k) != root) {
            if let Some(entity) = self.entities.iter().find(|e| e.key() == Some(key)) {
                ordered.push(entity.clone());
            }
        }
        Ok(ordered)
    }
}

/// Identity-deduplicated accumulator of one walk.
#[derive(Default)]
struct Collected {
    entities: Vec<Entity>,
    keys: HashSet<EntityKey>,
    edges: Vec<(EntityKey, EntityKey)>,
}

impl Collected {
    /// Returns false if the entity was already collected.
    fn insert(&mut self, entity: Entity) -> bool {
        let fresh = match entity.key() {
            Some(key) => self.keys.insert(key),
            None => !self.entities.iter().any(|e| e.ptr_eq(&entity)),
        };
        if fresh {
            self.entities.push(entity);
        }
        fresh
    }

    fn link(&mut self, dependency: &Entity, dependent: &Entity) {
        if let (Some(from), Some(to)) = (dependency.key(), dependent.key()) {
            self.edges.push((from, to));
        }
    }

    fn merge(&mut self, other: Collected) {
        for entity in other.entities {
            self.insert(entity);
        }
        self.edges.extend(other.edges);
    }
}

fn describe(entity: &Entity) -> String {
    format!("{} '{}'", entity.kind(), entity.label())
}

pub struct Extractor<R = DomainRelations> {
    relations: R,
    config: ExtractConfig,
}

impl Extractor<DomainRelations> {
    pub fn new(config: ExtractConfig) -> Self {
        Self::with_relations(DomainRelations, config)
    }
}

impl Default for Extractor<DomainRelations> {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl<R: RelationAccess> Extractor<R> {
    pub fn with_relations(relations: R, config: ExtractConfig) -> Self {
        Self { relations, config }
    }

    /// Entities an entity refers to directly and that need persisting.
    ///
    /// An empty result is accepted only when every relation the kind declares
    /// is optional (e.g. a node with no operator assigned).
    pub fn direct(&self, entity: &Entity) -> MappingResult<Vec<Entity>> {
        let tags = self.relations.relation_kinds(entity.kind());
        let found: Vec<Entity> = self
            .relations
            .relations(entity)?
            .iter()
            .flat_map(Relation::persistable)
            .collect();

        if found.is_empty() {
            if tags.is_empty() {
                return Err(MappingError::ExtractionConfiguration {
                    entity: describe(entity),
                    reason: "the kind exposes no relations".into(),
                });
            }
            if let Some(required) = tags.iter().find(|t| !t.is_optional()) {
                return Err(MappingError::ExtractionConfiguration {
                    entity: describe(entity),
                    reason: format!("required relation {required} yielded nothing"),
                });
            }
        }
        Ok(found)
    }

    /// Collect everything `entity` depends on, transitively.
    ///
    /// Fails only if the root's own relations are misconfigured; branch
    /// failures are reported in [`Extraction::failures`].
    pub fn extract(&self, entity: &Entity) -> MappingResult<Extraction> {
        let direct = self.direct(entity)?;

        let branch = |child: &Entity| -> MappingResult<Collected> {
            let mut collected = Collected::default();
            if !self.relations.relation_kinds(child.kind()).is_empty() {
                self.walk(child, &mut collected)?;
            }
            Ok(collected)
        };
        let results: Vec<MappingResult<Collected>> = if self.config.parallel {
            direct.par_iter().map(branch).collect()
        } else {
            direct.iter().map(branch).collect()
        };

        let mut collected = Collected::default();
        for child in &direct {
            collected.link(child, entity);
            collected.insert(child.clone());
        }

        let mut failures = Vec::new();
        for (child, result) in direct.into_iter().zip(results) {
            match result {
                Ok(sub) => collected.merge(sub),
                Err(error) => {
                    warn!(
                        root = %describe(entity),
                        branch = %describe(&child),
                        error = %error,
                        "extraction branch failed"
                    );
                    failures.push(BranchFailure {
                        entity: child,
                        error,
                    });
                }
            }
        }

        debug!(
            root = %describe(entity),
            entities = collected.entities.len(),
            failed_branches = failures.len(),
            "extracted dependencies"
        );
        Ok(Extraction {
            root: entity.clone(),
            entities: collected.entities,
            edges: collected.edges,
            failures,
        })
    }

    fn walk(&self, entity: &Entity, collected: &mut Collected) -> MappingResult<()> {
        for child in self.direct(entity)? {
            collected.link(&child, entity);
            let recurse = !self.relations.relation_kinds(child.kind()).is_empty();
            if collected.insert(child.clone()) && recurse {
                self.walk(&child, collected)?;
            }
        }
        Ok(())
    }
}
