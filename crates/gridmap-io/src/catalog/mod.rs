//! Field catalog: how each entity kind is built from a flat record.
//!
//! An [`EntityCatalog`] lists the construction parameters of one kind in
//! constructor order, classifies each one and declares the named signatures
//! (field-name sets bound to a builder) a record may match. The built-in
//! catalogs live in the submodules and are computed once per process.
//!
//! ## Parameter classes
//!
//! - [`ParamKind::Direct`]: one field, one leaf strategy
//! - [`ParamKind::Nested`]: a sub-record over a fixed field group, decoded as
//!   another entity kind
//! - [`ParamKind::External`]: a reference supplied through the resolved
//!   context, never decoded from raw text

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::{anyhow, bail};
use chrono::{DateTime, FixedOffset};
use gridmap_core::input::{no_operator_assigned, OperationTime, OperatorInput};
use gridmap_core::units::{Quantity, Unit};
use gridmap_core::{Entity, EntityKind, GeoPoint, MappingError, MappingResult, Value};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::record::{FieldRecord, ResolvedContext};
use crate::strategy::LeafKind;

mod grid;
mod participant;
mod result;
mod thermal;
mod timeseries;

/// Optional field group shared by all operated assets.
pub(crate) const OPERATED: &[&str] = &["operator", "operatesfrom", "operatesuntil"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Direct(LeafKind),
    Nested {
        target: EntityKind,
        fields: &'static [&'static str],
    },
    External(EntityKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: &'static str,
    kind: ParamKind,
}

impl Param {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Record fields this parameter consumes.
    pub fn fields(&self) -> &[&'static str] {
        match &self.kind {
            ParamKind::Nested { fields, .. } => fields,
            ParamKind::Direct(_) | ParamKind::External(_) => std::slice::from_ref(&self.name),
        }
    }
}

/// Builds an entity from the assembled arguments.
pub type Builder = fn(&Args) -> anyhow::Result<Entity>;

/// A named constructor variant and the field set that selects it.
#[derive(Clone)]
pub struct Signature {
    name: String,
    params: BTreeSet<&'static str>,
    fields: BTreeSet<&'static str>,
    /// `fields` minus the fields every signature of the kind has.
    distinct: BTreeSet<&'static str>,
    build: Builder,
}

impl Signature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &BTreeSet<&'static str> {
        &self.fields
    }

    /// Whether the parameter takes part in this variant.
    pub fn binds(&self, param: &str) -> bool {
        self.params.contains(param)
    }

    pub fn build(&self, args: &Args) -> anyhow::Result<Entity> {
        (self.build)(args)
    }

    fn matches(&self, supplied: &BTreeSet<&str>) -> bool {
        self.distinct.len() == supplied.len() && supplied.iter().all(|f| self.distinct.contains(*f))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Catalog entry of one entity kind.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    kind: EntityKind,
    params: Vec<Param>,
    signatures: Vec<Signature>,
    known: BTreeSet<&'static str>,
    shared: BTreeSet<&'static str>,
    unknown_params: Vec<&'static str>,
}

impl EntityCatalog {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Parameters in constructor order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Every field some parameter consumes.
    pub fn known_fields(&self) -> &BTreeSet<&'static str> {
        &self.known
    }

    /// Fields bound by every signature. They never decide the selection.
    pub fn shared_fields(&self) -> &BTreeSet<&'static str> {
        &self.shared
    }

    /// Check the catalog can describe records unambiguously.
    pub fn validate(&self) -> MappingResult<()> {
        let broken =
            |reason: String| MappingError::Config(format!("{} catalog: {reason}", self.kind));

        if self.signatures.is_empty() {
            return Err(broken("no constructor signature".into()));
        }
        if let Some(name) = self.unknown_params.first() {
            return Err(broken(format!("signature binds unknown parameter '{name}'")));
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for param in &self.params {
            for field in param.fields() {
                if let Some(other) = owners.insert(*field, param.name) {
                    return Err(broken(format!(
                        "field '{field}' is claimed by both '{other}' and '{}'",
                        param.name
                    )));
                }
            }
        }

        for (i, a) in self.signatures.iter().enumerate() {
            if let Some(b) = self.signatures[i + 1..].iter().find(|b| b.fields == a.fields) {
                return Err(broken(format!(
                    "signatures '{}' and '{}' share the field set {:?}",
                    a.name, b.name, a.fields
                )));
            }
        }
        Ok(())
    }

    /// Pick the signature for a record.
    ///
    /// Supplied keys are the record fields plus context entries, restricted to
    /// fields the catalog knows. Exactly one signature must have the supplied
    /// keys as its field set, compared over the fields that tell signatures
    /// apart. Shared fields don't count, so a missing one surfaces as a null
    /// argument in construction. A kind with a single signature always uses
    /// it.
    pub fn select(
        &self,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<&Signature> {
        let supplied: BTreeSet<&str> = record
            .keys()
            .chain(ctx.keys())
            .filter(|k| self.known.contains(*k))
            .collect();
        let distinct: BTreeSet<&str> = supplied
            .iter()
            .copied()
            .filter(|k| !self.shared.contains(*k))
            .collect();
        let matching: Vec<&Signature> = self
            .signatures
            .iter()
            .filter(|s| s.matches(&distinct))
            .collect();

        match matching.as_slice() {
            [one] => Ok(*one),
            _ => Err(MappingError::NoMatchingSignature {
                entity: self.kind,
                supplied: supplied.iter().map(|s| s.to_string()).collect(),
                candidates: self
                    .signatures
                    .iter()
                    .map(|s| s.fields.iter().map(|f| f.to_string()).collect())
                    .collect(),
                matches: matching.len(),
            }),
        }
    }
}

/// Assembles an [`EntityCatalog`].
pub(crate) struct CatalogBuilder {
    kind: EntityKind,
    params: Vec<Param>,
    signatures: Vec<(String, Vec<&'static str>, Builder)>,
}

impl CatalogBuilder {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            signatures: Vec::new(),
        }
    }

    pub(crate) fn direct(mut self, name: &'static str, leaf: LeafKind) -> Self {
        self.params.push(Param {
            name,
            kind: ParamKind::Direct(leaf),
        });
        self
    }

    pub(crate) fn quantity(self, name: &'static str, unit: Unit) -> Self {
        self.direct(name, LeafKind::Quantity(unit))
    }

    pub(crate) fn nested(
        mut self,
        name: &'static str,
        target: EntityKind,
        fields: &'static [&'static str],
    ) -> Self {
        self.params.push(Param {
            name,
            kind: ParamKind::Nested { target, fields },
        });
        self
    }

    pub(crate) fn external(mut self, name: &'static str, target: EntityKind) -> Self {
        self.params.push(Param {
            name,
            kind: ParamKind::External(target),
        });
        self
    }

    /// `operator`, `operatesfrom` and `operatesuntil`.
    pub(crate) fn operated(self) -> Self {
        self.external("operator", EntityKind::Operator)
            .direct("operatesfrom", LeafKind::Timestamp)
            .direct("operatesuntil", LeafKind::Timestamp)
    }

    pub(crate) fn signature(
        mut self,
        name: impl Into<String>,
        params: &[&'static str],
        build: Builder,
    ) -> Self {
        self.signatures.push((name.into(), params.to_vec(), build));
        self
    }

    /// One signature per subset of `optional`; every other parameter is
    /// required in all of them.
    pub(crate) fn variants(mut self, optional: &[&'static str], build: Builder) -> Self {
        let required: Vec<&'static str> = self
            .params
            .iter()
            .map(|p| p.name)
            .filter(|n| !optional.contains(n))
            .collect();

        for mask in 0u32..(1 << optional.len()) {
            let chosen: Vec<&'static str> = optional
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, name)| *name)
                .collect();
            let name = if chosen.is_empty() {
                "base".to_string()
            } else {
                chosen.join("+")
            };
            let mut params = required.clone();
            params.extend(chosen);
            self.signatures.push((name, params, build));
        }
        self
    }

    /// Single signature over every parameter.
    pub(crate) fn all(self, build: Builder) -> Self {
        self.variants(&[], build)
    }

    pub(crate) fn finish(self) -> EntityCatalog {
        let known = self
            .params
            .iter()
            .flat_map(|p| p.fields().iter().copied())
            .collect();

        let mut unknown_params = Vec::new();
        let field_sets: Vec<BTreeSet<&'static str>> = self
            .signatures
            .iter()
            .map(|(_, names, _)| {
                let mut fields = BTreeSet::new();
                for n in names {
                    match self.params.iter().find(|p| p.name == *n) {
                        Some(p) => fields.extend(p.fields().iter().copied()),
                        None => unknown_params.push(*n),
                    }
                }
                fields
            })
            .collect();

        let shared: BTreeSet<&'static str> = match field_sets.split_first() {
            Some((first, rest)) => first
                .iter()
                .copied()
                .filter(|f| rest.iter().all(|set| set.contains(f)))
                .collect(),
            None => BTreeSet::new(),
        };

        let signatures = self
            .signatures
            .into_iter()
            .zip(field_sets)
            .map(|((name, names, build), fields)| Signature {
                name,
                params: names.into_iter().collect(),
                distinct: fields.difference(&shared).copied().collect(),
                fields,
                build,
            })
            .collect();

        EntityCatalog {
            kind: self.kind,
            params: self.params,
            signatures,
            known,
            shared,
            unknown_params,
        }
    }
}

/// Arguments handed to a [`Builder`], in constructor order.
///
/// Unbound and absent parameters are [`Value::Null`]. The getters fail with a
/// message naming the parameter when a required value is missing or of the
/// wrong type.
#[derive(Debug, Clone)]
pub struct Args {
    entity: EntityKind,
    values: Vec<(&'static str, Value)>,
}

impl Args {
    pub(crate) fn new(entity: EntityKind, values: Vec<(&'static str, Value)>) -> Self {
        Self { entity, values }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn get(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(&NULL, |(_, v)| v)
    }

    fn required(&self, name: &str) -> anyhow::Result<&Value> {
        match self.get(name) {
            Value::Null => bail!("missing value for '{name}'"),
            value => Ok(value),
        }
    }

    fn mismatch(name: &str, expected: &str, found: &Value) -> anyhow::Error {
        anyhow!(
            "'{name}' expects a {expected}, got a {} ({found})",
            found.type_name()
        )
    }

    pub fn uuid(&self, name: &str) -> anyhow::Result<Uuid> {
        match self.required(name)? {
            Value::Uuid(u) => Ok(*u),
            other => Err(Self::mismatch(name, "uuid", other)),
        }
    }

    pub fn text(&self, name: &str) -> anyhow::Result<String> {
        match self.required(name)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(Self::mismatch(name, "string", other)),
        }
    }

    /// Text, with absent values read as empty.
    pub fn text_or_default(&self, name: &str) -> anyhow::Result<String> {
        match self.get(name) {
            Value::Null => Ok(String::new()),
            _ => self.text(name),
        }
    }

    pub fn boolean(&self, name: &str) -> anyhow::Result<bool> {
        match self.required(name)? {
            Value::Bool(b) => Ok(*b),
            other => Err(Self::mismatch(name, "boolean", other)),
        }
    }

    pub fn integer(&self, name: &str) -> anyhow::Result<i64> {
        match self.required(name)? {
            Value::Int(i) => Ok(*i),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    pub fn quantity(&self, name: &str) -> anyhow::Result<Quantity> {
        match self.required(name)? {
            Value::Quantity(q) => Ok(*q),
            other => Err(Self::mismatch(name, "quantity", other)),
        }
    }

    pub fn timestamp(&self, name: &str) -> anyhow::Result<DateTime<FixedOffset>> {
        match self.required(name)? {
            Value::Timestamp(t) => Ok(*t),
            other => Err(Self::mismatch(name, "timestamp", other)),
        }
    }

    pub fn opt_timestamp(&self, name: &str) -> anyhow::Result<Option<DateTime<FixedOffset>>> {
        match self.get(name) {
            Value::Null => Ok(None),
            _ => self.timestamp(name).map(Some),
        }
    }

    pub fn geo(&self, name: &str) -> anyhow::Result<Option<GeoPoint>> {
        match self.get(name) {
            Value::Null => Ok(None),
            Value::GeoPoint(p) => Ok(*p),
            other => Err(Self::mismatch(name, "geo-point", other)),
        }
    }

    /// A referenced entity, narrowed with one of the `Entity::as_*` accessors.
    pub fn entity_ref<T>(
        &self,
        name: &str,
        pick: fn(&Entity) -> Option<&Arc<T>>,
    ) -> anyhow::Result<Arc<T>> {
        let value = self.required(name)?;
        value
            .as_entity()
            .and_then(pick)
            .cloned()
            .ok_or_else(|| Self::mismatch(name, "reference of the declared kind", value))
    }

    pub fn opt_entity_ref<T>(
        &self,
        name: &str,
        pick: fn(&Entity) -> Option<&Arc<T>>,
    ) -> anyhow::Result<Option<Arc<T>>> {
        match self.get(name) {
            Value::Null => Ok(None),
            _ => self.entity_ref(name, pick).map(Some),
        }
    }

    /// The `operator` argument; absent means unassigned.
    pub fn operator(&self) -> anyhow::Result<Arc<OperatorInput>> {
        Ok(self
            .opt_entity_ref("operator", Entity::as_operator)?
            .unwrap_or_else(no_operator_assigned))
    }

    pub fn operation_time(&self) -> anyhow::Result<OperationTime> {
        Ok(OperationTime::new(
            self.opt_timestamp("operatesfrom")?,
            self.opt_timestamp("operatesuntil")?,
        )?)
    }

    /// Rendered argument map, for diagnostics.
    pub fn describe(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

/// Supplies the catalog entry of an entity kind.
pub trait FieldCatalogSource: Send + Sync {
    fn catalog(&self, kind: EntityKind) -> Option<Arc<EntityCatalog>>;
}

static BUILTIN: Lazy<HashMap<EntityKind, Arc<EntityCatalog>>> = Lazy::new(|| {
    EntityKind::ALL
        .iter()
        .map(|kind| (*kind, Arc::new(builtin_entry(*kind))))
        .collect()
});

fn builtin_entry(kind: EntityKind) -> EntityCatalog {
    match kind {
        EntityKind::Operator => grid::operator(),
        EntityKind::VoltageLevel => grid::voltage_level(),
        EntityKind::Node => grid::node(),
        EntityKind::LineType => grid::line_type(),
        EntityKind::Line => grid::line(),
        EntityKind::LineGraphic => grid::line_graphic(),
        EntityKind::Load => participant::load(),
        EntityKind::EnergyManager => participant::energy_manager(),
        EntityKind::ChpType => participant::chp_type(),
        EntityKind::Chp => participant::chp(),
        EntityKind::ThermalBus => thermal::thermal_bus(),
        EntityKind::CylindricalStorage => thermal::cylindrical_storage(),
        EntityKind::NodeResult => result::node_result(),
        EntityKind::LoadResult => result::load_result(),
        EntityKind::TimeBasedValue => timeseries::time_based_value(),
        EntityKind::Irradiance => timeseries::irradiance(),
        EntityKind::Temperature => timeseries::temperature(),
        EntityKind::Wind => timeseries::wind(),
    }
}

/// Catalog entries for every entity kind of the domain model.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl FieldCatalogSource for BuiltinCatalog {
    fn catalog(&self, kind: EntityKind) -> Option<Arc<EntityCatalog>> {
        BUILTIN.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_are_valid() {
        for kind in EntityKind::ALL {
            let catalog = BuiltinCatalog.catalog(*kind).unwrap();
            assert_eq!(catalog.kind(), *kind);
            catalog.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_catalog_is_cached() {
        let a = BuiltinCatalog.catalog(EntityKind::Node).unwrap();
        let b = BuiltinCatalog.catalog(EntityKind::Node).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_operated_variants() {
        let node = BuiltinCatalog.catalog(EntityKind::Node).unwrap();
        // operator, operatesfrom, operatesuntil and geoposition are optional
        assert_eq!(node.signatures().len(), 16);
        let base = node.signatures().iter().find(|s| s.name() == "base").unwrap();
        let fields: Vec<_> = base.fields().iter().copied().collect();
        assert_eq!(
            fields,
            vec!["id", "slack", "subnet", "uuid", "voltlvl", "vrated", "vtarget"]
        );
        assert!(!base.binds("operator"));
    }

    #[test]
    fn test_select_by_exact_field_set() {
        let node = BuiltinCatalog.catalog(EntityKind::Node).unwrap();
        let record: FieldRecord = [
            ("uuid", "3e6be3ac-2b51-4080-b815-391313612fc7"),
            ("id", "Node 1"),
            ("vtarget", "1.0"),
            ("vrated", "110.0"),
            ("slack", "true"),
            ("subnet", "3"),
            ("voltlvl", "hv"),
            ("operator", ""),
            ("somethingnew", "ignored"),
        ]
        .into_iter()
        .collect();

        let sig = node.select(&record, &ResolvedContext::new()).unwrap();
        assert_eq!(sig.name(), "operator");
        assert!(sig.binds("operator"));
    }

    #[test]
    fn test_missing_shared_field_still_selects() {
        let node = BuiltinCatalog.catalog(EntityKind::Node).unwrap();
        let shared: Vec<_> = node.shared_fields().iter().copied().collect();
        assert_eq!(
            shared,
            vec!["id", "slack", "subnet", "uuid", "voltlvl", "vrated", "vtarget"]
        );

        let record = FieldRecord::new()
            .with("uuid", "x")
            .with("id", "n")
            .with("geoposition", "");
        let sig = node.select(&record, &ResolvedContext::new()).unwrap();
        assert_eq!(sig.name(), "geoposition");
    }

    #[test]
    fn test_select_reports_candidates() {
        let values = BuiltinCatalog.catalog(EntityKind::TimeBasedValue).unwrap();
        let record = FieldRecord::new()
            .with("uuid", "x")
            .with("time", "t")
            .with("price", "1.0")
            .with("p", "2.0");
        let err = values.select(&record, &ResolvedContext::new()).unwrap_err();
        match err {
            MappingError::NoMatchingSignature {
                entity,
                supplied,
                candidates,
                matches,
            } => {
                assert_eq!(entity, EntityKind::TimeBasedValue);
                assert_eq!(supplied, vec!["p", "price", "time", "uuid"]);
                assert_eq!(candidates.len(), 7);
                assert_eq!(matches, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_single_signature_always_selected() {
        let line_type = BuiltinCatalog.catalog(EntityKind::LineType).unwrap();
        let record = FieldRecord::new().with("uuid", "x");
        assert!(line_type.select(&record, &ResolvedContext::new()).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_field_sets() {
        fn build(_: &Args) -> anyhow::Result<Entity> {
            bail!("unused")
        }
        let catalog = CatalogBuilder::new(EntityKind::Operator)
            .direct("uuid", LeafKind::Uuid)
            .signature("a", &["uuid"], build)
            .signature("b", &["uuid"], build)
            .finish();
        let err = catalog.validate().unwrap_err();
        assert!(err.is_configuration());

        let catalog = CatalogBuilder::new(EntityKind::Operator)
            .direct("uuid", LeafKind::Uuid)
            .signature("a", &["uuid", "nope"], build)
            .finish();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_args_getters() {
        let args = Args::new(
            EntityKind::Operator,
            vec![
                ("id", Value::Text("TSO".into())),
                ("subnet", Value::Int(3)),
                ("operator", Value::Null),
            ],
        );
        assert_eq!(args.text("id").unwrap(), "TSO");
        assert_eq!(args.integer("subnet").unwrap(), 3);
        assert!(args.operator().unwrap().is_unassigned());
        assert!(args.operation_time().unwrap() == OperationTime::not_limited());

        let err = args.boolean("id").unwrap_err();
        assert!(err.to_string().contains("expects a boolean"));
        let err = args.uuid("uuid").unwrap_err();
        assert!(err.to_string().contains("missing value for 'uuid'"));

        assert_eq!(args.describe()["subnet"], "3");
    }
}
