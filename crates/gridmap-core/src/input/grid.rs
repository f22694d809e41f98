use std::sync::Arc;

use uuid::Uuid;

use super::{in_unit, non_negative, OperationTime, OperatorInput};
use crate::geo::GeoPoint;
use crate::units::{Quantity, Unit};
use crate::{MappingError, MappingResult};

/// Voltage level a node belongs to (e.g. "hv" at 110 kV).
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageLevel {
    pub id: String,
    /// Nominal voltage (kV)
    pub nominal_voltage: Quantity,
}

impl VoltageLevel {
    pub fn new(id: impl Into<String>, nominal_voltage: Quantity) -> MappingResult<Self> {
        let nominal_voltage = in_unit("nominal voltage", nominal_voltage, Unit::Kilovolt)?;
        non_negative("nominal voltage", nominal_voltage.value())?;
        Ok(Self {
            id: id.into(),
            nominal_voltage,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    /// Target voltage magnitude (pu)
    pub v_target: Quantity,
    pub slack: bool,
    pub geo_position: Option<GeoPoint>,
    pub volt_lvl: Arc<VoltageLevel>,
    pub subnet: u32,
}

impl NodeInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        v_target: Quantity,
        slack: bool,
        geo_position: Option<GeoPoint>,
        volt_lvl: Arc<VoltageLevel>,
        subnet: i64,
    ) -> MappingResult<Self> {
        let v_target = in_unit("target voltage", v_target, Unit::PerUnit)?;
        let subnet = u32::try_from(subnet).map_err(|_| {
            MappingError::Validation(format!("subnet must be a non-negative number, got {subnet}"))
        })?;
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            v_target,
            slack,
            geo_position,
            volt_lvl,
            subnet,
        })
    }
}

/// Electrical parameters shared by lines of the same type.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTypeInput {
    pub uuid: Uuid,
    pub id: String,
    /// Phase-to-ground susceptance (µS/km)
    pub b: Quantity,
    /// Phase-to-ground conductance (µS/km)
    pub g: Quantity,
    /// Resistance (Ω/km)
    pub r: Quantity,
    /// Reactance (Ω/km)
    pub x: Quantity,
    /// Maximum thermal current (A)
    pub i_max: Quantity,
    /// Rated voltage (kV)
    pub v_rated: Quantity,
}

impl LineTypeInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        b: Quantity,
        g: Quantity,
        r: Quantity,
        x: Quantity,
        i_max: Quantity,
        v_rated: Quantity,
    ) -> MappingResult<Self> {
        let b = in_unit("b", b, Unit::MicrosiemensPerKilometre)?;
        let g = in_unit("g", g, Unit::MicrosiemensPerKilometre)?;
        let r = in_unit("r", r, Unit::OhmPerKilometre)?;
        let x = in_unit("x", x, Unit::OhmPerKilometre)?;
        let i_max = in_unit("maximum current", i_max, Unit::Ampere)?;
        let v_rated = in_unit("rated voltage", v_rated, Unit::Kilovolt)?;
        for (what, q) in [("b", b), ("g", g), ("r", r), ("x", x), ("maximum current", i_max)] {
            non_negative(what, q.value())?;
        }
        Ok(Self {
            uuid,
            id: id.into(),
            b,
            g,
            r,
            x,
            i_max,
            v_rated,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    pub node_a: Arc<NodeInput>,
    pub node_b: Arc<NodeInput>,
    pub parallel_devices: u32,
    pub line_type: Arc<LineTypeInput>,
    /// Line length (km)
    pub length: Quantity,
    /// Overhead line monitoring characteristic
    pub olm_characteristic: String,
}

impl LineInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        node_a: Arc<NodeInput>,
        node_b: Arc<NodeInput>,
        parallel_devices: i64,
        line_type: Arc<LineTypeInput>,
        length: Quantity,
        olm_characteristic: impl Into<String>,
    ) -> MappingResult<Self> {
        let parallel_devices = u32::try_from(parallel_devices)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                MappingError::Validation(format!(
                    "a line needs at least one parallel device, got {parallel_devices}"
                ))
            })?;
        let length = in_unit("length", length, Unit::Kilometre)?;
        non_negative("length", length.value())?;
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            node_a,
            node_b,
            parallel_devices,
            line_type,
            length,
            olm_characteristic: olm_characteristic.into(),
        })
    }
}

/// Schematic drawing information for a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGraphicInput {
    pub uuid: Uuid,
    pub graphic_layer: String,
    pub line: Arc<LineInput>,
}

impl LineGraphicInput {
    pub fn new(uuid: Uuid, graphic_layer: impl Into<String>, line: Arc<LineInput>) -> Self {
        Self {
            uuid,
            graphic_layer: graphic_layer.into(),
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::no_operator_assigned;

    fn mv() -> Arc<VoltageLevel> {
        Arc::new(VoltageLevel::new("mv", Quantity::new(20.0, Unit::Kilovolt)).unwrap())
    }

    fn node(id: &str) -> Arc<NodeInput> {
        Arc::new(
            NodeInput::new(
                Uuid::new_v4(),
                id,
                no_operator_assigned(),
                OperationTime::not_limited(),
                Quantity::new(1.0, Unit::PerUnit),
                false,
                None,
                mv(),
                1,
            )
            .unwrap(),
        )
    }

    fn line_type() -> Arc<LineTypeInput> {
        Arc::new(
            LineTypeInput::new(
                Uuid::new_v4(),
                "NA2XS2Y 1x240",
                Quantity::new(191.0, Unit::MicrosiemensPerKilometre),
                Quantity::new(0.0, Unit::MicrosiemensPerKilometre),
                Quantity::new(0.122, Unit::OhmPerKilometre),
                Quantity::new(0.112, Unit::OhmPerKilometre),
                Quantity::new(421.0, Unit::Ampere),
                Quantity::new(20.0, Unit::Kilovolt),
            )
            .unwrap(),
        )
    }

    fn line(parallel: i64, length_km: f64) -> MappingResult<LineInput> {
        LineInput::new(
            Uuid::new_v4(),
            "line",
            no_operator_assigned(),
            OperationTime::not_limited(),
            node("a"),
            node("b"),
            parallel,
            line_type(),
            Quantity::new(length_km, Unit::Kilometre),
            "olm:{(0.0,1.0)}",
        )
    }

    #[test]
    fn test_voltage_level_converts_to_kilovolt() {
        let lvl = VoltageLevel::new("hv", Quantity::new(110_000.0, Unit::Volt)).unwrap();
        assert_eq!(lvl.nominal_voltage, Quantity::new(110.0, Unit::Kilovolt));
        assert!(VoltageLevel::new("bad", Quantity::new(1.0, Unit::Ampere)).is_err());
    }

    #[test]
    fn test_node_rejects_negative_subnet() {
        let err = NodeInput::new(
            Uuid::new_v4(),
            "n",
            no_operator_assigned(),
            OperationTime::not_limited(),
            Quantity::new(1.0, Unit::PerUnit),
            false,
            None,
            mv(),
            -1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("subnet"));
    }

    #[test]
    fn test_line_validation() {
        assert!(line(1, 1.5).is_ok());
        assert!(line(0, 1.5).unwrap_err().to_string().contains("parallel"));
        assert!(line(1, -0.1).unwrap_err().to_string().contains("length"));
    }

    #[test]
    fn test_line_type_rejects_negative_impedance() {
        let result = LineTypeInput::new(
            Uuid::new_v4(),
            "broken",
            Quantity::new(0.0, Unit::MicrosiemensPerKilometre),
            Quantity::new(0.0, Unit::MicrosiemensPerKilometre),
            Quantity::new(-0.1, Unit::OhmPerKilometre),
            Quantity::new(0.1, Unit::OhmPerKilometre),
            Quantity::new(100.0, Unit::Ampere),
            Quantity::new(0.4, Unit::Kilovolt),
        );
        assert!(matches!(result, Err(MappingError::Validation(_))));
    }
}
