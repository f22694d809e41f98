//! Time-based values and the series grouping them.
//!
//! A [`TimeBasedValue`] pairs a timestamp with one [`TsValue`]. The value
//! variant determines the [`RecordFamily`], i.e. which columns a flattened
//! row of it has. Weather readings embed three further sub-values.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::input::{in_unit, non_negative};
use crate::units::{Quantity, Unit};
use crate::{MappingError, MappingResult};

/// Row layout of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordFamily {
    EnergyPrice,
    ActivePower,
    ApparentPower,
    HeatDemand,
    ActivePowerAndHeatDemand,
    ApparentPowerAndHeatDemand,
    Weather,
}

impl RecordFamily {
    pub const ALL: &'static [RecordFamily] = &[
        RecordFamily::EnergyPrice,
        RecordFamily::ActivePower,
        RecordFamily::ApparentPower,
        RecordFamily::HeatDemand,
        RecordFamily::ActivePowerAndHeatDemand,
        RecordFamily::ApparentPowerAndHeatDemand,
        RecordFamily::Weather,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecordFamily::EnergyPrice => "energy_price",
            RecordFamily::ActivePower => "p",
            RecordFamily::ApparentPower => "pq",
            RecordFamily::HeatDemand => "h",
            RecordFamily::ActivePowerAndHeatDemand => "ph",
            RecordFamily::ApparentPowerAndHeatDemand => "pqh",
            RecordFamily::Weather => "weather",
        }
    }
}

impl std::fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Solar irradiance on a horizontal plane.
#[derive(Debug, Clone, PartialEq)]
pub struct IrradianceValue {
    /// Diffuse irradiance (W/m²)
    pub diffuse_irradiance: Quantity,
    /// Direct irradiance (W/m²)
    pub direct_irradiance: Quantity,
}

impl IrradianceValue {
    pub fn new(diffuse_irradiance: Quantity, direct_irradiance: Quantity) -> MappingResult<Self> {
        let diffuse_irradiance =
            in_unit("diffuse irradiance", diffuse_irradiance, Unit::WattPerSquareMetre)?;
        let direct_irradiance =
            in_unit("direct irradiance", direct_irradiance, Unit::WattPerSquareMetre)?;
        non_negative("diffuse irradiance", diffuse_irradiance.value())?;
        non_negative("direct irradiance", direct_irradiance.value())?;
        Ok(Self {
            diffuse_irradiance,
            direct_irradiance,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureValue {
    /// Air temperature (K)
    pub temperature: Quantity,
}

impl TemperatureValue {
    pub fn new(temperature: Quantity) -> MappingResult<Self> {
        let temperature = in_unit("temperature", temperature, Unit::Kelvin)?;
        non_negative("absolute temperature", temperature.value())?;
        Ok(Self { temperature })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindValue {
    /// Direction the wind blows from, clockwise from north (°)
    pub direction: Quantity,
    /// Wind speed (m/s)
    pub velocity: Quantity,
}

impl WindValue {
    pub fn new(direction: Quantity, velocity: Quantity) -> MappingResult<Self> {
        let direction = in_unit("wind direction", direction, Unit::Degree)?;
        let velocity = in_unit("wind velocity", velocity, Unit::MetrePerSecond)?;
        non_negative("wind velocity", velocity.value())?;
        Ok(Self {
            direction,
            velocity,
        })
    }
}

/// A weather reading at a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherValue {
    pub coordinate: GeoPoint,
    pub irradiance: Arc<IrradianceValue>,
    pub temperature: Arc<TemperatureValue>,
    pub wind: Arc<WindValue>,
}

/// Payload of a time-based value. Powers are kW/kvar, prices EUR/MWh.
#[derive(Debug, Clone, PartialEq)]
pub enum TsValue {
    EnergyPrice {
        price: Quantity,
    },
    P {
        p: Quantity,
    },
    Pq {
        p: Quantity,
        q: Quantity,
    },
    HeatDemand {
        heat_demand: Quantity,
    },
    PHeat {
        p: Quantity,
        heat_demand: Quantity,
    },
    PqHeat {
        p: Quantity,
        q: Quantity,
        heat_demand: Quantity,
    },
    Weather(WeatherValue),
}

impl TsValue {
    pub fn energy_price(price: Quantity) -> MappingResult<Self> {
        Ok(TsValue::EnergyPrice {
            price: in_unit("price", price, Unit::EuroPerMegawattHour)?,
        })
    }

    pub fn p(p: Quantity) -> MappingResult<Self> {
        Ok(TsValue::P { p: active(p)? })
    }

    pub fn pq(p: Quantity, q: Quantity) -> MappingResult<Self> {
        Ok(TsValue::Pq {
            p: active(p)?,
            q: reactive(q)?,
        })
    }

    pub fn heat_demand(heat_demand: Quantity) -> MappingResult<Self> {
        Ok(TsValue::HeatDemand {
            heat_demand: heat(heat_demand)?,
        })
    }

    pub fn p_heat(p: Quantity, heat_demand: Quantity) -> MappingResult<Self> {
        Ok(TsValue::PHeat {
            p: active(p)?,
            heat_demand: heat(heat_demand)?,
        })
    }

    pub fn pq_heat(p: Quantity, q: Quantity, heat_demand: Quantity) -> MappingResult<Self> {
        Ok(TsValue::PqHeat {
            p: active(p)?,
            q: reactive(q)?,
            heat_demand: heat(heat_demand)?,
        })
    }

    pub fn family(&self) -> RecordFamily {
        match self {
            TsValue::EnergyPrice { .. } => RecordFamily::EnergyPrice,
            TsValue::P { .. } => RecordFamily::ActivePower,
            TsValue::Pq { .. } => RecordFamily::ApparentPower,
            TsValue::HeatDemand { .. } => RecordFamily::HeatDemand,
            TsValue::PHeat { .. } => RecordFamily::ActivePowerAndHeatDemand,
            TsValue::PqHeat { .. } => RecordFamily::ApparentPowerAndHeatDemand,
            TsValue::Weather(_) => RecordFamily::Weather,
        }
    }
}

fn active(p: Quantity) -> MappingResult<Quantity> {
    in_unit("active power", p, Unit::Kilowatt)
}

fn reactive(q: Quantity) -> MappingResult<Quantity> {
    in_unit("reactive power", q, Unit::Kilovar)
}

fn heat(h: Quantity) -> MappingResult<Quantity> {
    in_unit("heat demand", h, Unit::Kilowatt)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeBasedValue {
    pub uuid: Uuid,
    pub time: DateTime<FixedOffset>,
    pub value: TsValue,
}

impl TimeBasedValue {
    pub fn new(uuid: Uuid, time: DateTime<FixedOffset>, value: TsValue) -> Self {
        Self { uuid, time, value }
    }

    pub fn family(&self) -> RecordFamily {
        self.value.family()
    }
}

/// Entries of one family, ordered by time.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualTimeSeries {
    pub uuid: Uuid,
    pub entries: Vec<Arc<TimeBasedValue>>,
}

impl IndividualTimeSeries {
    pub fn new(uuid: Uuid, mut entries: Vec<Arc<TimeBasedValue>>) -> MappingResult<Self> {
        if let Some(first) = entries.first() {
            let family = first.family();
            if let Some(odd) = entries.iter().find(|e| e.family() != family) {
                return Err(MappingError::Validation(format!(
                    "time series {uuid} mixes {family} and {} entries",
                    odd.family()
                )));
            }
        }
        entries.sort_by_key(|e| e.time);
        Ok(Self { uuid, entries })
    }

    pub fn family(&self) -> Option<RecordFamily> {
        self.entries.first().map(|e| e.family())
    }

    pub fn value_at(&self, time: DateTime<FixedOffset>) -> Option<&TsValue> {
        self.entries
            .binary_search_by_key(&time, |e| e.time)
            .ok()
            .map(|i| &self.entries[i].value)
    }
}
