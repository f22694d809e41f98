//! # gridmap-io: Record <-> Entity Mapping
//!
//! Turns flat field records (lower-cased field name to raw text, one per CSV
//! row or document) into the typed entities of [`gridmap_core`], and turns
//! entities back into records.
//!
//! ## Design Philosophy
//!
//! **Catalog driven**: every entity kind has a field catalog listing its
//! construction parameters and the field-name sets (signatures) it can be
//! built from. Decoding picks the signature whose field set equals the
//! supplied field names exactly, over the fields that tell signatures apart.
//! Fields every signature shares are always bound, so a missing one fails in
//! construction. Unknown fields are ignored.
//!
//! **One strategy per type**: the [`StrategyRegistry`] caches exactly one
//! strategy per target type. Leaf strategies are installed up front,
//! composite strategies are derived on first use.
//!
//! **Errors by class**: a bad row yields a parsing or construction error and
//! batches carry on; a broken catalog is a configuration error and stops
//! everything before the first row.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridmap_io::{processor, FieldRecord, ResolvedContext, StrategyRegistry};
//! use gridmap_core::EntityKind;
//!
//! let record = FieldRecord::new()
//!     .with("uuid", "3e6be3ac-2b51-4080-b815-391313612fc7")
//!     .with("id", "Node 1")
//!     .with("vtarget", "1.0")
//!     .with("vrated", "110.0")
//!     .with("slack", "true")
//!     .with("subnet", "3")
//!     .with("voltlvl", "hv");
//!
//! let registry = StrategyRegistry::global();
//! let node = registry
//!     .decode_entity(EntityKind::Node, &record, &ResolvedContext::new())
//!     .unwrap();
//! let flat = processor::flatten(&node).unwrap();
//! assert_eq!(flat.get("vrated"), Some("110.0"));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Field catalogs of the built-in kinds
//! - [`strategy`] - Leaf and composite strategies, the registry
//! - [`constructor`] - Generic entity construction from a record
//! - [`context`] - Reference index building the resolved-value context
//! - [`processor`] - Flattening with unit normalization
//! - [`extractor`] - Transitive dependency extraction
//! - [`batch`] - Row-parallel decode and flatten
//! - [`config`] - TOML configuration

pub mod batch;
pub mod catalog;
pub mod config;
pub mod constructor;
pub mod context;
pub mod extractor;
pub mod processor;
pub mod record;
pub mod strategy;

pub use batch::{decode_batch, flatten_batch, BatchOutcome};
pub use catalog::{BuiltinCatalog, EntityCatalog, FieldCatalogSource};
pub use config::{BatchConfig, BooleanPolicy, DecodeConfig, ExtractConfig, MappingConfig};
pub use context::{ReferenceIndex, Resolution, Substitution};
pub use extractor::{Extraction, Extractor, RelationAccess};
pub use record::{FieldRecord, FlatRecord, ResolvedContext};
pub use strategy::{LeafKind, Strategy, StrategyRegistry, TargetType};
