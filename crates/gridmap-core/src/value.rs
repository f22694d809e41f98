//! Dynamically typed values flowing between leaf strategies and constructors.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::units::Quantity;
use crate::Entity;

/// A decoded leaf value or an already constructed entity.
///
/// `Null` is the absent argument: a field missing from the record, or an
/// empty field for a kind where empty text carries no value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Uuid(Uuid),
    Timestamp(DateTime<FixedOffset>),
    /// `None` is the explicit "no point" decoded from blank text
    GeoPoint(Option<GeoPoint>),
    Quantity(Quantity),
    Entity(Entity),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in argument-type mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::GeoPoint(_) => "geo-point",
            Value::Quantity(_) => "quantity",
            Value::Entity(_) => "entity",
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Timestamp(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::GeoPoint(None) => f.write_str("no point"),
            Value::GeoPoint(Some(p)) => f.write_str(&p.to_geojson()),
            Value::Quantity(q) => write!(f, "{q}"),
            Value::Entity(e) => write!(f, "{} {}", e.kind(), e.label()),
        }
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
