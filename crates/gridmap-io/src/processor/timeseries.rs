//! Flattening of time-based values, assembled from several field sources.
//!
//! A row of a time series combines the series (its uuid, only when a whole
//! series is flattened), the entry (uuid and time), the value and, for
//! weather readings, the irradiance, temperature and wind sub-values. Each
//! output column belongs to exactly one source; [`partition`] lists them.

use std::collections::{BTreeMap, BTreeSet};

use gridmap_core::timeseries::{IndividualTimeSeries, RecordFamily, TimeBasedValue, TsValue};
use gridmap_core::{EntityKind, MappingError, MappingResult, Value};
use uuid::Uuid;

use super::accessors::{self, read};
use super::stringify;
use crate::record::FlatRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSource {
    Series,
    Entry,
    Value,
    Irradiance,
    Temperature,
    Wind,
}

impl FieldSource {
    pub fn name(self) -> &'static str {
        match self {
            FieldSource::Series => "series",
            FieldSource::Entry => "entry",
            FieldSource::Value => "value",
            FieldSource::Irradiance => "irradiance",
            FieldSource::Temperature => "temperature",
            FieldSource::Wind => "wind",
        }
    }

    /// Kind whose output units apply to this source's quantities.
    fn unit_kind(self) -> EntityKind {
        match self {
            FieldSource::Irradiance => EntityKind::Irradiance,
            FieldSource::Temperature => EntityKind::Temperature,
            FieldSource::Wind => EntityKind::Wind,
            FieldSource::Series | FieldSource::Entry | FieldSource::Value => {
                EntityKind::TimeBasedValue
            }
        }
    }
}

fn value_columns(family: RecordFamily) -> &'static [&'static str] {
    match family {
        RecordFamily::EnergyPrice => &["price"],
        RecordFamily::ActivePower => &["p"],
        RecordFamily::ApparentPower => &["p", "q"],
        RecordFamily::HeatDemand => &["heatdemand"],
        RecordFamily::ActivePowerAndHeatDemand => &["heatdemand", "p"],
        RecordFamily::ApparentPowerAndHeatDemand => &["heatdemand", "p", "q"],
        RecordFamily::Weather => &["coordinate"],
    }
}

/// Columns contributed by each source for a record family.
pub fn partition(
    family: RecordFamily,
    with_series: bool,
) -> Vec<(FieldSource, &'static [&'static str])> {
    let mut parts: Vec<(FieldSource, &'static [&'static str])> = Vec::new();
    if with_series {
        parts.push((FieldSource::Series, &["series"]));
    }
    parts.push((FieldSource::Entry, &["uuid", "time"]));
    parts.push((FieldSource::Value, value_columns(family)));
    if family == RecordFamily::Weather {
        parts.push((
            FieldSource::Irradiance,
            &["diffuseirradiance", "directirradiance"],
        ));
        parts.push((FieldSource::Temperature, &["temperature"]));
        parts.push((FieldSource::Wind, &["winddirection", "windvelocity"]));
    }
    parts
}

/// Output header of a record family: `uuid` first, the rest by name.
pub fn header(family: RecordFamily, with_series: bool) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = partition(family, with_series)
        .into_iter()
        .flat_map(|(_, columns)| columns.iter().copied())
        .filter(|c| *c != "uuid")
        .collect();
    columns.sort_unstable();
    columns.insert(0, "uuid");
    columns
}

fn source_fields(
    source: FieldSource,
    entry: &TimeBasedValue,
    series: Option<Uuid>,
) -> Vec<(&'static str, Value)> {
    let weather = match &entry.value {
        TsValue::Weather(w) => Some(w),
        _ => None,
    };
    match source {
        FieldSource::Series => series.map(|s| vec![("series", s.into())]).unwrap_or_default(),
        FieldSource::Entry => vec![("uuid", entry.uuid.into()), ("time", entry.time.into())],
        FieldSource::Value => match &entry.value {
            TsValue::EnergyPrice { price } => vec![("price", (*price).into())],
            TsValue::P { p } => vec![("p", (*p).into())],
            TsValue::Pq { p, q } => vec![("p", (*p).into()), ("q", (*q).into())],
            TsValue::HeatDemand { heat_demand } => vec![("heatdemand", (*heat_demand).into())],
            TsValue::PHeat { p, heat_demand } => {
                vec![("p", (*p).into()), ("heatdemand", (*heat_demand).into())]
            }
            TsValue::PqHeat { p, q, heat_demand } => vec![
                ("p", (*p).into()),
                ("q", (*q).into()),
                ("heatdemand", (*heat_demand).into()),
            ],
            TsValue::Weather(w) => vec![("coordinate", Value::GeoPoint(Some(w.coordinate)))],
        },
        FieldSource::Irradiance => weather
            .map(|w| read(accessors::IRRADIANCE, &w.irradiance))
            .unwrap_or_default(),
        FieldSource::Temperature => weather
            .map(|w| read(accessors::TEMPERATURE, &w.temperature))
            .unwrap_or_default(),
        FieldSource::Wind => weather
            .map(|w| read(accessors::WIND, &w.wind))
            .unwrap_or_default(),
    }
}

fn flatten_with(entry: &TimeBasedValue, series: Option<Uuid>) -> MappingResult<FlatRecord> {
    let mut map = BTreeMap::new();
    for (source, columns) in partition(entry.family(), series.is_some()) {
        let fields = source_fields(source, entry, series);

        let supplied: BTreeSet<&str> = fields.iter().map(|(f, _)| *f).collect();
        let expected: BTreeSet<&str> = columns.iter().copied().collect();
        if supplied != expected {
            return Err(MappingError::Flatten {
                entity: EntityKind::TimeBasedValue,
                field: source.name().to_string(),
                value: format!("{supplied:?}"),
                reason: format!("source must supply exactly {expected:?}"),
            });
        }

        for (field, value) in fields {
            let text = stringify(source.unit_kind(), field, &value)?;
            if map.insert(field.to_string(), text).is_some() {
                return Err(MappingError::Flatten {
                    entity: EntityKind::TimeBasedValue,
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: format!("claimed again by the {} source", source.name()),
                });
            }
        }
    }
    Ok(FlatRecord::from_map(map))
}

/// Flatten a stand-alone time-based value.
pub fn flatten_entry(entry: &TimeBasedValue) -> MappingResult<FlatRecord> {
    flatten_with(entry, None)
}

/// Flatten every entry of a series, each row carrying the series uuid.
pub fn flatten_time_series(series: &IndividualTimeSeries) -> MappingResult<Vec<FlatRecord>> {
    series
        .entries
        .iter()
        .map(|entry| flatten_with(entry, Some(series.uuid)))
        .collect()
}
