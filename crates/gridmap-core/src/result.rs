//! Simulation results attached to an input model at a point in time.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::input::in_unit;
use crate::units::{Quantity, Unit};
use crate::MappingResult;

/// Voltage at a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeResult {
    pub uuid: Uuid,
    pub time: DateTime<FixedOffset>,
    /// Uuid of the node this result belongs to
    pub input_model: Uuid,
    /// Voltage magnitude (pu)
    pub v_mag: Quantity,
    /// Voltage angle (°)
    pub v_ang: Quantity,
}

impl NodeResult {
    pub fn new(
        uuid: Uuid,
        time: DateTime<FixedOffset>,
        input_model: Uuid,
        v_mag: Quantity,
        v_ang: Quantity,
    ) -> MappingResult<Self> {
        Ok(Self {
            uuid,
            time,
            input_model,
            v_mag: in_unit("voltage magnitude", v_mag, Unit::PerUnit)?,
            v_ang: in_unit("voltage angle", v_ang, Unit::Degree)?,
        })
    }
}

/// Power drawn by a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub uuid: Uuid,
    pub time: DateTime<FixedOffset>,
    pub input_model: Uuid,
    /// Active power (MW)
    pub p: Quantity,
    /// Reactive power (Mvar)
    pub q: Quantity,
}

impl LoadResult {
    pub fn new(
        uuid: Uuid,
        time: DateTime<FixedOffset>,
        input_model: Uuid,
        p: Quantity,
        q: Quantity,
    ) -> MappingResult<Self> {
        Ok(Self {
            uuid,
            time,
            input_model,
            p: in_unit("active power", p, Unit::Megawatt)?,
            q: in_unit("reactive power", q, Unit::Megavar)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_normalizes_units() {
        let time = DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z").unwrap();
        let res = LoadResult::new(
            Uuid::new_v4(),
            time,
            Uuid::new_v4(),
            Quantity::new(250.0, Unit::Kilowatt),
            Quantity::new(10.0, Unit::Kilovar),
        )
        .unwrap();
        assert!((res.p.value() - 0.25).abs() < 1e-12);
        assert_eq!(res.q.unit(), Unit::Megavar);

        let angle = NodeResult::new(
            Uuid::new_v4(),
            time,
            Uuid::new_v4(),
            Quantity::new(1.0, Unit::PerUnit),
            Quantity::new(std::f64::consts::PI, Unit::Radian),
        )
        .unwrap();
        assert!((angle.v_ang.value() - 180.0).abs() < 1e-9);
    }
}
