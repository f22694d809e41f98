use chrono::{DateTime, FixedOffset, SecondsFormat};
use gridmap_core::geo::GeoPoint;
use gridmap_core::units::Quantity;
use gridmap_core::{MappingError, MappingResult, Value};
use uuid::Uuid;

use super::LeafKind;
use crate::config::BooleanPolicy;
use crate::record::{FieldRecord, ResolvedContext};

/// Key a leaf decodes from when handed a whole record.
const VALUE_KEY: &str = "value";

/// Decodes and encodes one textual value of a single [`LeafKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafStrategy {
    kind: LeafKind,
    boolean_policy: BooleanPolicy,
}

impl LeafStrategy {
    pub fn new(kind: LeafKind, boolean_policy: BooleanPolicy) -> Self {
        Self {
            kind,
            boolean_policy,
        }
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Decode one raw value.
    ///
    /// Blank text is [`Value::Null`] for every kind except strings (kept
    /// verbatim) and geo points ("no point").
    pub fn decode_text(&self, raw: &str) -> MappingResult<Value> {
        let text = raw.trim();
        if text.is_empty() && !self.kind.accepts_empty() {
            return Ok(Value::Null);
        }
        let fail =
            |reason: &dyn std::fmt::Display| MappingError::parsing(self.kind.name(), raw, reason);

        match self.kind {
            LeafKind::Text => Ok(Value::Text(raw.to_string())),
            LeafKind::Boolean => parse_bool(text, self.boolean_policy)
                .map(Value::Bool)
                .ok_or_else(|| fail(&"expected 'true' or 'false'")),
            LeafKind::Integer => text.parse::<i64>().map(Value::Int).map_err(|e| fail(&e)),
            LeafKind::Uuid => parse_uuid(text).map(Value::Uuid).map_err(|e| fail(&e)),
            LeafKind::Timestamp => parse_timestamp(text)
                .map(Value::Timestamp)
                .map_err(|e| fail(&e)),
            LeafKind::GeoPoint => GeoPoint::from_geojson(text)
                .map(Value::GeoPoint)
                .map_err(|e| fail(&e)),
            LeafKind::Quantity(unit) => Quantity::parse(text, unit)
                .map(Value::Quantity)
                .map_err(|e| fail(&e)),
        }
    }

    /// Decode from a record carrying a single relevant field.
    ///
    /// The canonical `value` key is preferred, else the first field in name
    /// order. Fields already present in the context are never re-decoded;
    /// their context value is returned instead.
    pub fn decode_record(
        &self,
        record: &FieldRecord,
        ctx: &ResolvedContext,
    ) -> MappingResult<Value> {
        if let Some(value) = ctx.get(VALUE_KEY) {
            return Ok(value.clone());
        }
        let mut open = record.iter().filter(|(k, _)| !ctx.contains(k));
        let chosen = match record.get(VALUE_KEY) {
            Some(raw) => Some(raw),
            None => open.next().map(|(_, raw)| raw),
        };
        match chosen {
            Some(raw) => self.decode_text(raw),
            None => Ok(record
                .keys()
                .find_map(|k| ctx.get(k).cloned())
                .unwrap_or(Value::Null)),
        }
    }

    /// Encode a value of this kind back to text. Null encodes as empty text.
    pub fn encode(&self, value: &Value) -> MappingResult<String> {
        let mismatch = || {
            MappingError::parsing(
                self.kind.name(),
                &value.to_string(),
                format!("cannot encode a {} value", value.type_name()),
            )
        };
        let text = match (self.kind, value) {
            (_, Value::Null) => String::new(),
            (LeafKind::Text, Value::Text(s)) => s.clone(),
            (LeafKind::Boolean, Value::Bool(b)) => b.to_string(),
            (LeafKind::Integer, Value::Int(i)) => i.to_string(),
            (LeafKind::Uuid, Value::Uuid(u)) => u.hyphenated().to_string(),
            (LeafKind::Timestamp, Value::Timestamp(t)) => format_timestamp(t),
            (LeafKind::GeoPoint, Value::GeoPoint(p)) => {
                p.map(|p| p.to_geojson()).unwrap_or_default()
            }
            (LeafKind::Quantity(unit), Value::Quantity(q)) => {
                let converted = q.to(unit).map_err(|e| {
                    MappingError::parsing(self.kind.name(), &q.to_string(), e)
                })?;
                format_decimal(converted.value()).ok_or_else(|| {
                    MappingError::parsing(self.kind.name(), &q.to_string(), "not a finite number")
                })?
            }
            _ => return Err(mismatch()),
        };
        Ok(text)
    }
}

fn parse_bool(text: &str, policy: BooleanPolicy) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        match policy {
            BooleanPolicy::Strict => None,
            BooleanPolicy::Lenient => Some(false),
        }
    }
}

fn parse_uuid(text: &str) -> Result<Uuid, String> {
    // only the hyphenated 8-4-4-4-12 form
    if text.len() != 36 {
        return Err(format!("expected 36 characters, found {}", text.len()));
    }
    Uuid::parse_str(text).map_err(|e| e.to_string())
}

/// ISO-8601 with offset, optionally followed by a `[Region/Zone]` suffix.
fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let text = match text.find('[') {
        Some(i) if text.ends_with(']') => &text[..i],
        _ => text,
    };
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%#z"))
}

fn format_timestamp(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Fixed-point text for a magnitude, no exponent and no grouping.
///
/// Integral values keep one decimal (`110.0`). Returns `None` for NaN and
/// infinities.
pub fn format_decimal(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(format!("{value:.1}"))
    } else {
        Some(format!("{value}"))
    }
}
