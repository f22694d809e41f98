//! Physical quantities carried by grid assets.
//!
//! Prevents mixing incompatible units like kW and kVA, or kilovolts and per-unit.
//!
//! # Design Philosophy
//!
//! Asset records store magnitudes as bare decimal text, the unit being implied
//! by the owning type and field (a node's `vrated` is kV, a time series `p` is
//! kW, a result `p` is MW). A [`Quantity`] keeps the magnitude together with its
//! [`Unit`], and every unit belongs to exactly one [`UnitFamily`]. Conversion is
//! only possible inside a family:
//!
//! ```
//! use gridmap_core::units::{Quantity, Unit};
//!
//! let rated = Quantity::new(110.0, Unit::Kilovolt);
//! let volts = rated.to(Unit::Volt).unwrap();
//! assert_eq!(volts.value(), 110_000.0);
//!
//! // Voltage can never become power
//! assert!(rated.to(Unit::Kilowatt).is_err());
//! ```
//!
//! # Parsing
//!
//! [`Quantity::parse`] accepts either a bare magnitude, read in the declared unit,
//! or a magnitude followed by a symbol of the same family (with or without a
//! space), converted into the declared unit:
//!
//! ```
//! use gridmap_core::units::{Quantity, Unit};
//!
//! let a = Quantity::parse("0.4", Unit::Kilovolt).unwrap();
//! let b = Quantity::parse("400 V", Unit::Kilovolt).unwrap();
//! assert_eq!(a, b);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical dimension a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    Dimensionless,
    Voltage,
    ActivePower,
    ReactivePower,
    ApparentPower,
    Energy,
    Current,
    Length,
    Angle,
    Temperature,
    SpecificResistance,
    SpecificConductance,
    Irradiance,
    Velocity,
    Volume,
    SpecificHeatCapacity,
    EnergyPrice,
}

/// Errors raised by unit conversion and quantity parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("cannot convert {from} into {to}: different unit families")]
    FamilyMismatch { from: Unit, to: Unit },

    #[error("'{symbol}' is not a known {family:?} unit")]
    UnknownSymbol { symbol: String, family: UnitFamily },

    #[error("'{0}' is not a decimal magnitude")]
    Malformed(String),
}

/// Generates the closed [`Unit`] table.
///
/// Each row is `Variant => (Family, "symbol", scale, offset, [aliases])`, where
/// `base = value * scale + offset` maps a value into the family base unit.
macro_rules! unit_table {
    ($(
        $variant:ident => ($family:ident, $symbol:literal, $scale:expr, $offset:expr, [$($alias:literal),*])
    ),* $(,)?) => {
        /// A unit of measurement, always bound to one [`UnitFamily`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Unit {
            $( $variant, )*
        }

        impl Unit {
            /// Every known unit.
            pub const ALL: &'static [Unit] = &[$( Unit::$variant, )*];

            /// The family this unit measures.
            pub fn family(self) -> UnitFamily {
                match self {
                    $( Unit::$variant => UnitFamily::$family, )*
                }
            }

            /// Display symbol.
            pub fn symbol(self) -> &'static str {
                match self {
                    $( Unit::$variant => $symbol, )*
                }
            }

            fn aliases(self) -> &'static [&'static str] {
                match self {
                    $( Unit::$variant => &[$($alias),*], )*
                }
            }

            fn scale(self) -> f64 {
                match self {
                    $( Unit::$variant => $scale, )*
                }
            }

            fn offset(self) -> f64 {
                match self {
                    $( Unit::$variant => $offset, )*
                }
            }
        }
    };
}

unit_table! {
    PerUnit => (Dimensionless, "pu", 1.0, 0.0, ["p.u."]),
    Percent => (Dimensionless, "%", 0.01, 0.0, []),
    Volt => (Voltage, "V", 1.0, 0.0, []),
    Kilovolt => (Voltage, "kV", 1e3, 0.0, []),
    Watt => (ActivePower, "W", 1.0, 0.0, []),
    Kilowatt => (ActivePower, "kW", 1e3, 0.0, []),
    Megawatt => (ActivePower, "MW", 1e6, 0.0, []),
    Var => (ReactivePower, "var", 1.0, 0.0, ["VAr"]),
    Kilovar => (ReactivePower, "kvar", 1e3, 0.0, ["kVAr"]),
    Megavar => (ReactivePower, "Mvar", 1e6, 0.0, ["MVAr"]),
    VoltAmpere => (ApparentPower, "VA", 1.0, 0.0, []),
    KilovoltAmpere => (ApparentPower, "kVA", 1e3, 0.0, []),
    MegavoltAmpere => (ApparentPower, "MVA", 1e6, 0.0, []),
    WattHour => (Energy, "Wh", 1.0, 0.0, []),
    KilowattHour => (Energy, "kWh", 1e3, 0.0, []),
    MegawattHour => (Energy, "MWh", 1e6, 0.0, []),
    Ampere => (Current, "A", 1.0, 0.0, []),
    Kiloampere => (Current, "kA", 1e3, 0.0, []),
    Metre => (Length, "m", 1.0, 0.0, []),
    Kilometre => (Length, "km", 1e3, 0.0, []),
    Radian => (Angle, "rad", 1.0, 0.0, []),
    Degree => (Angle, "°", std::f64::consts::PI / 180.0, 0.0, ["deg"]),
    Kelvin => (Temperature, "K", 1.0, 0.0, []),
    Celsius => (Temperature, "°C", 1.0, 273.15, ["degC"]),
    OhmPerKilometre => (SpecificResistance, "Ω/km", 1.0, 0.0, ["ohm/km"]),
    SiemensPerKilometre => (SpecificConductance, "S/km", 1.0, 0.0, []),
    MicrosiemensPerKilometre => (SpecificConductance, "µS/km", 1e-6, 0.0, ["uS/km"]),
    WattPerSquareMetre => (Irradiance, "W/m²", 1.0, 0.0, ["W/m2"]),
    MetrePerSecond => (Velocity, "m/s", 1.0, 0.0, []),
    CubicMetre => (Volume, "m³", 1.0, 0.0, ["m3"]),
    KilowattHourPerKelvinCubicMetre => (SpecificHeatCapacity, "kWh/(K·m³)", 1.0, 0.0, ["kWh/K/m3"]),
    EuroPerMegawattHour => (EnergyPrice, "EUR/MWh", 1.0, 0.0, ["€/MWh"]),
}

impl Unit {
    /// Look up a unit of `family` by symbol or alias (case-sensitive, `kW` is not `KW`).
    pub fn from_symbol(symbol: &str, family: UnitFamily) -> Result<Unit, UnitError> {
        Unit::ALL
            .iter()
            .copied()
            .filter(|u| u.family() == family)
            .find(|u| u.symbol() == symbol || u.aliases().contains(&symbol))
            .ok_or_else(|| UnitError::UnknownSymbol {
                symbol: symbol.to_string(),
                family,
            })
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A magnitude with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    #[inline]
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Get the raw numeric value
    #[inline]
    pub const fn value(self) -> f64 {
        self.value
    }

    #[inline]
    pub const fn unit(self) -> Unit {
        self.unit
    }

    /// Check if value is finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.value.is_finite()
    }

    /// Convert into another unit of the same family.
    pub fn to(self, target: Unit) -> Result<Quantity, UnitError> {
        if self.unit == target {
            return Ok(self);
        }
        if self.unit.family() != target.family() {
            return Err(UnitError::FamilyMismatch {
                from: self.unit,
                to: target,
            });
        }
        let base = self.value * self.unit.scale() + self.unit.offset();
        Ok(Quantity::new((base - target.offset()) / target.scale(), target))
    }

    /// Parse `"<magnitude>"` or `"<magnitude>[ ]<symbol>"` into the declared
    /// unit. The space before the symbol is optional (`"5EUR/MWh"`).
    pub fn parse(text: &str, declared: Unit) -> Result<Quantity, UnitError> {
        let text = text.trim();
        let (magnitude, symbol) = text.split_at(magnitude_len(text));
        let value: f64 = magnitude
            .parse()
            .map_err(|_| UnitError::Malformed(text.to_string()))?;
        if !value.is_finite() {
            return Err(UnitError::Malformed(text.to_string()));
        }

        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Ok(Quantity::new(value, declared));
        }
        let unit = Unit::from_symbol(symbol, declared.family())?;
        Quantity::new(value, unit).to(declared)
    }
}

/// Length of the leading decimal number in `text`: sign, digits, fraction
/// and an exponent. `e`/`E` only belongs to the number when digits follow.
fn magnitude_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} {}", self.value, self.unit.symbol())
    }
}
