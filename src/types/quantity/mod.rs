//! Values with an absolute uncertainty and a physical dimension.
//!
//! # Internal units
//!
//! Value and uncertainty are always stored in **base units** (meter, gram,
//! second, ampere, kelvin, candela). Unit-scaled input is converted once at
//! construction, so arithmetic never rescales. Rendering converts back to
//! the display unit.
//!
//! Uncertainty propagation is worst-case: absolute uncertainties add under
//! addition and subtraction, relative uncertainties add under multiplication
//! and division.

mod parse;

use std::fmt;

use serde::Serialize;

use crate::types::units::{Dimension, DisplayDimension, DisplayNumber, UnitError, UnitTable};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantityError {
    #[error("Could not parse number: {0}")]
    MalformedLiteral(String),

    #[error("Can't combine values with different units: {left} and {right}")]
    DimensionMismatch { left: String, right: String },

    #[error("Can not convert {dimension} to incompatible units \"{unit}\"")]
    IncompatibleUnits { dimension: String, unit: String },

    #[error("{0} produced a non-finite result")]
    NonFiniteResult(&'static str),

    #[error("{0}")]
    Unit(#[from] UnitError),
}

/// How the uncertainty passed to [`Quantity::with_options`] is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertaintyKind {
    /// Same unit as the value
    Absolute,
    /// Fraction of the value
    Relative,
}

/// Which scale the value passed to [`Quantity::with_options`] is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueScale {
    /// The dimension's own unit (e.g. km); multiplied by its scale factor
    Unit,
    /// Already in base units
    Base,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    value: f64,
    uncertainty: f64,
    dimension: Dimension,
}

/// Serializable rendering of a quantity in a display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityReport {
    pub value: f64,
    pub uncertainty: f64,
    pub unit: String,
}

impl Quantity {
    /// Value and absolute uncertainty in the unit of `dimension`.
    pub fn new(value: f64, uncertainty: f64, dimension: Dimension) -> Self {
        Self::with_options(
            value,
            uncertainty,
            dimension,
            UncertaintyKind::Absolute,
            ValueScale::Unit,
        )
    }

    pub fn with_options(
        value: f64,
        uncertainty: f64,
        dimension: Dimension,
        kind: UncertaintyKind,
        scale: ValueScale,
    ) -> Self {
        let mut uncertainty = match kind {
            UncertaintyKind::Absolute => uncertainty,
            UncertaintyKind::Relative => uncertainty * value,
        };
        let mut value = value;

        if scale == ValueScale::Unit {
            value *= dimension.scale();
            uncertainty *= dimension.scale();
        }

        Self::from_base(value, uncertainty, dimension)
    }

    /// Value and absolute uncertainty already in base units.
    pub fn from_base(value: f64, uncertainty: f64, dimension: Dimension) -> Self {
        Self {
            value,
            uncertainty: uncertainty.abs(),
            dimension: dimension.to_base(),
        }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::from_base(value, 0.0, Dimension::dimensionless())
    }

    /// Value in base units
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Absolute uncertainty in base units
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Uncertainty as a fraction of the value (infinite for a zero value
    /// with non-zero uncertainty).
    pub fn relative_uncertainty(&self) -> f64 {
        if self.uncertainty == 0.0 {
            0.0
        } else {
            (self.uncertainty / self.value).abs()
        }
    }

    pub fn is_compatible(&self, other: &Quantity) -> bool {
        self.dimension == other.dimension
    }

    pub fn add(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.require_compatible(other)?;
        finite(
            "addition",
            self.value + other.value,
            self.uncertainty + other.uncertainty,
            self.dimension,
        )
    }

    pub fn subtract(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.require_compatible(other)?;
        finite(
            "subtraction",
            self.value - other.value,
            self.uncertainty + other.uncertainty,
            self.dimension,
        )
    }

    pub fn multiply(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        let dimension = self.dimension.multiply(&other.dimension)?;
        let uncertainty =
            (self.uncertainty * other.value).abs() + (other.uncertainty * self.value).abs();
        finite("multiplication", self.value * other.value, uncertainty, dimension)
    }

    pub fn divide(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        if other.value == 0.0 {
            return Err(QuantityError::NonFiniteResult("division"));
        }
        let dimension = self.dimension.divide(&other.dimension)?;
        let quotient = self.value / other.value;
        let uncertainty = (self.uncertainty / other.value).abs()
            + (other.uncertainty * quotient / other.value).abs();
        finite("division", quotient, uncertainty, dimension)
    }

    /// Integer power; uncertainty follows `|n| * u * |v|^(n-1)`.
    pub fn power(&self, power: i32) -> Result<Quantity, QuantityError> {
        let dimension = self.dimension.power(power)?;
        if power == 0 {
            return Ok(Quantity::from_base(1.0, 0.0, dimension));
        }
        let value = self.value.powi(power);
        let derivative = match power.checked_sub(1) {
            Some(n) => self.value.powi(n),
            None => self.value.powf(f64::from(power) - 1.0),
        };
        let uncertainty = (f64::from(power) * self.uncertainty * derivative).abs();
        let uncertainty = if self.uncertainty == 0.0 { 0.0 } else { uncertainty };
        finite("exponentiation", value, uncertainty, dimension)
    }

    pub fn negate(&self) -> Quantity {
        Quantity::from_base(-self.value, self.uncertainty, self.dimension)
    }

    fn require_compatible(&self, other: &Quantity) -> Result<(), QuantityError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(QuantityError::DimensionMismatch {
                left: DisplayDimension(&self.dimension).to_string(),
                right: DisplayDimension(&other.dimension).to_string(),
            })
        }
    }

    /// Render in the table's canonical unit for this dimension.
    pub fn display<'a>(&'a self, table: &'a UnitTable) -> DisplayQuantity<'a> {
        DisplayQuantity {
            quantity: self,
            table,
        }
    }

    /// Render in a requested unit, e.g. `"km/h"`. The unit text is echoed
    /// verbatim.
    pub fn to_string_in(&self, table: &UnitTable, unit: &str) -> Result<String, QuantityError> {
        Ok(self.report_in(table, unit)?.to_string())
    }

    pub fn report(&self, table: &UnitTable) -> QuantityReport {
        let canonical = table.canonical(&self.dimension);
        QuantityReport {
            value: self.value / canonical.scale,
            uncertainty: self.uncertainty / canonical.scale,
            unit: canonical.symbol,
        }
    }

    pub fn report_in(&self, table: &UnitTable, unit: &str) -> Result<QuantityReport, QuantityError> {
        let target = table.parse(unit)?;
        if target != self.dimension {
            return Err(QuantityError::IncompatibleUnits {
                dimension: DisplayDimension(&self.dimension).to_string(),
                unit: unit.to_string(),
            });
        }
        Ok(QuantityReport {
            value: self.value / target.scale(),
            uncertainty: self.uncertainty / target.scale(),
            unit: unit.to_string(),
        })
    }
}

fn finite(
    operation: &'static str,
    value: f64,
    uncertainty: f64,
    dimension: Dimension,
) -> Result<Quantity, QuantityError> {
    if value.is_finite() && uncertainty.is_finite() {
        Ok(Quantity::from_base(value, uncertainty, dimension))
    } else {
        Err(QuantityError::NonFiniteResult(operation))
    }
}

fn write_parts(f: &mut fmt::Formatter<'_>, value: f64, uncertainty: f64, unit: &str) -> fmt::Result {
    write!(f, "{}±{}", DisplayNumber(value), DisplayNumber(uncertainty))?;
    if !unit.is_empty() {
        write!(f, " {}", unit)?;
    }
    Ok(())
}

impl fmt::Display for QuantityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_parts(f, self.value, self.uncertainty, &self.unit)
    }
}

/// A quantity rendered through a [`UnitTable`].
#[derive(Debug)]
pub struct DisplayQuantity<'a> {
    quantity: &'a Quantity,
    table: &'a UnitTable,
}

impl fmt::Display for DisplayQuantity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.quantity.report(self.table), f)
    }
}

/// Base units only, without a table.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.dimension.symbol_expression();
        write_parts(f, self.value, self.uncertainty, &unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> UnitTable {
        UnitTable::builtin().unwrap()
    }

    fn q(text: &str) -> Quantity {
        Quantity::parse(text, &table()).unwrap()
    }

    #[test]
    fn test_construction_scales_to_base() {
        let km = table().parse("km").unwrap();
        let d = Quantity::new(2.0, 0.1, km);
        assert_relative_eq!(d.value(), 2000.0);
        assert_relative_eq!(d.uncertainty(), 100.0);
    }

    #[test]
    fn test_relative_uncertainty_construction() {
        let kg = table().parse("kg").unwrap();
        let m = Quantity::with_options(2.0, 0.01, kg, UncertaintyKind::Relative, ValueScale::Unit);
        assert_relative_eq!(m.value(), 2000.0);
        assert_relative_eq!(m.uncertainty(), 20.0);
        assert_relative_eq!(m.relative_uncertainty(), 0.01);

        let base = Quantity::with_options(2.0, 0.5, kg, UncertaintyKind::Absolute, ValueScale::Base);
        assert_relative_eq!(base.value(), 2.0);
        assert_relative_eq!(base.uncertainty(), 0.5);
    }

    #[test]
    fn test_add_sums_uncertainties() {
        let sum = q("5+-0.1m").add(&q("20+-0.3cm")).unwrap();
        assert_relative_eq!(sum.value(), 5.2, epsilon = 1e-12);
        assert_relative_eq!(sum.uncertainty(), 0.103, epsilon = 1e-12);

        let diff = q("5+-0.1m").subtract(&q("3+-0.2m")).unwrap();
        assert_relative_eq!(diff.value(), 2.0);
        assert_relative_eq!(diff.uncertainty(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_add_rejects_mismatched_dimensions() {
        let err = q("5m").add(&q("3s")).unwrap_err();
        assert!(matches!(err, QuantityError::DimensionMismatch { .. }));
        assert!(q("5m").subtract(&q("3kg")).is_err());
    }

    #[test]
    fn test_multiply_adds_relative_uncertainties() {
        let area = q("10+-0.1m").multiply(&q("5+-0.1m")).unwrap();
        assert_relative_eq!(area.value(), 50.0);
        assert_relative_eq!(area.relative_uncertainty(), 0.01 + 0.02, epsilon = 1e-12);
        assert_eq!(area.dimension().exponents(), [2, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_divide() {
        let speed = q("100+-1m").divide(&q("10+-0.5s")).unwrap();
        assert_relative_eq!(speed.value(), 10.0);
        assert_relative_eq!(speed.relative_uncertainty(), 0.01 + 0.05, epsilon = 1e-12);
        assert_eq!(*speed.dimension(), table().parse("m/s").unwrap());
    }

    #[test]
    fn test_divide_by_zero_fails() {
        let err = q("1").divide(&q("0")).unwrap_err();
        assert_eq!(err, QuantityError::NonFiniteResult("division"));
    }

    #[test]
    fn test_multiply_with_zero_value_stays_finite() {
        let product = q("0+-0.1m").multiply(&q("3s")).unwrap();
        assert_eq!(product.value(), 0.0);
        assert_relative_eq!(product.uncertainty(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_power() {
        let cube = q("2+-0.1m").power(3).unwrap();
        assert_relative_eq!(cube.value(), 8.0);
        assert_relative_eq!(cube.uncertainty(), 3.0 * 0.1 * 4.0, epsilon = 1e-12);
        assert_eq!(cube.dimension().exponents(), [3, 0, 0, 0, 0, 0]);

        let inverse = q("4+-0.2s").power(-1).unwrap();
        assert_relative_eq!(inverse.value(), 0.25);
        assert_relative_eq!(inverse.relative_uncertainty(), 0.05, epsilon = 1e-12);

        let one = q("4+-0.2s").power(0).unwrap();
        assert_eq!(one.value(), 1.0);
        assert!(one.dimension().is_dimensionless());

        assert!(q("0").power(-1).is_err());
    }

    #[test]
    fn test_power_at_exponent_limits() {
        let tiny = q("2+-0.1").power(i32::MIN).unwrap();
        assert_eq!(tiny.value(), 0.0);
        assert_eq!(tiny.uncertainty(), 0.0);

        let one = q("1+-0.1").power(i32::MAX).unwrap();
        assert_eq!(one.value(), 1.0);
        assert!(matches!(q("2").power(i32::MAX), Err(QuantityError::NonFiniteResult(_))));
    }

    #[test]
    fn test_overflow_is_non_finite() {
        let huge = q("1E300");
        assert!(matches!(huge.multiply(&huge), Err(QuantityError::NonFiniteResult(_))));
    }

    #[test]
    fn test_canonical_display() {
        let t = table();
        assert_eq!(q("5").display(&t).to_string(), "5±0");
        assert_eq!(q("2+-0.5kN").display(&t).to_string(), "2000±500 N");
        assert_eq!(q("3m/s3").display(&t).to_string(), "3±0 m/s^3");
        assert_eq!(q("1.5kg").display(&t).to_string(), "1500±0 g");
    }

    #[test]
    fn test_display_in_unit() {
        let t = table();
        let speed = q("36+-3.6km/h");
        let report = speed.report_in(&t, "m/s").unwrap();
        assert_relative_eq!(report.value, 10.0, epsilon = 1e-9);
        assert_relative_eq!(report.uncertainty, 1.0, epsilon = 1e-9);
        assert!(speed.to_string_in(&t, "m/s").unwrap().ends_with(" m/s"));
        assert_eq!(q("1500m").to_string_in(&t, "km").unwrap(), "1.5±0 km");

        let err = speed.to_string_in(&t, "kg").unwrap_err();
        assert!(matches!(err, QuantityError::IncompatibleUnits { .. }));
        assert!(err.to_string().starts_with("Can not convert m/s"));
        assert!(matches!(speed.to_string_in(&t, "qq"), Err(QuantityError::Unit(_))));
    }

    #[test]
    fn test_report_serializes() {
        let t = table();
        let report = q("2+-0.5kN").report(&t);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unit"], "N");
        assert_eq!(json["value"], 2000.0);
    }

    #[test]
    fn test_base_display() {
        assert_eq!(q("2km/s").to_string(), "2000±0 m/s");
        assert_eq!(q("-1").negate().to_string(), "1±0");
    }
}
