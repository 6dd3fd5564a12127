//! Interop with the statically typed quantities of `uom`.
//!
//! `uom` checks dimensions at compile time; [`Quantity`] checks them at run
//! time. Converting into a `Quantity` carries no uncertainty. Converting back
//! fails with [`QuantityError::DimensionMismatch`] when the runtime dimension
//! does not match and drops the uncertainty.

use uom::si::f64::{
    Acceleration, Area, ElectricCharge, ElectricCurrent, ElectricPotential, Energy, Force,
    Frequency, Length, LuminousIntensity, Mass, Power, Pressure, ThermodynamicTemperature, Time,
    Velocity, Volume,
};
use uom::si::{
    acceleration::meter_per_second_squared, area::square_meter, electric_charge::coulomb,
    electric_current::ampere, electric_potential::volt, energy::joule, force::newton,
    frequency::hertz, length::meter, luminous_intensity::candela, mass::gram, power::watt,
    pressure::pascal, thermodynamic_temperature::kelvin, time::second, velocity::meter_per_second,
    volume::cubic_meter,
};

use crate::types::quantity::{Quantity, QuantityError};
use crate::types::units::{Dimension, DisplayDimension};

/// Each entry: uom type, the uom unit read and written, the exponent vector
/// and the factor from that unit to base units (grams carry the 1000 for
/// SI derived units built on the kilogram).
macro_rules! uom_interop {
    ($($quantity:ident => $unit:ident, $exponents:expr, $to_base:expr;)*) => {
        $(
            impl From<$quantity> for Quantity {
                fn from(quantity: $quantity) -> Self {
                    Quantity::from_base(
                        quantity.get::<$unit>() * $to_base,
                        0.0,
                        Dimension::new($exponents, 1.0),
                    )
                }
            }

            impl TryFrom<&Quantity> for $quantity {
                type Error = QuantityError;

                fn try_from(quantity: &Quantity) -> Result<Self, Self::Error> {
                    let expected = Dimension::new($exponents, 1.0);
                    if *quantity.dimension() != expected {
                        return Err(QuantityError::DimensionMismatch {
                            left: DisplayDimension(quantity.dimension()).to_string(),
                            right: DisplayDimension(&expected).to_string(),
                        });
                    }
                    Ok($quantity::new::<$unit>(quantity.value() / $to_base))
                }
            }
        )*
    };
}

uom_interop! {
    Length => meter, [1, 0, 0, 0, 0, 0], 1.0;
    Mass => gram, [0, 1, 0, 0, 0, 0], 1.0;
    Time => second, [0, 0, 1, 0, 0, 0], 1.0;
    ElectricCurrent => ampere, [0, 0, 0, 1, 0, 0], 1.0;
    ThermodynamicTemperature => kelvin, [0, 0, 0, 0, 1, 0], 1.0;
    LuminousIntensity => candela, [0, 0, 0, 0, 0, 1], 1.0;
    Area => square_meter, [2, 0, 0, 0, 0, 0], 1.0;
    Volume => cubic_meter, [3, 0, 0, 0, 0, 0], 1.0;
    Frequency => hertz, [0, 0, -1, 0, 0, 0], 1.0;
    Velocity => meter_per_second, [1, 0, -1, 0, 0, 0], 1.0;
    Acceleration => meter_per_second_squared, [1, 0, -2, 0, 0, 0], 1.0;
    Force => newton, [1, 1, -2, 0, 0, 0], 1000.0;
    Energy => joule, [2, 1, -2, 0, 0, 0], 1000.0;
    Power => watt, [2, 1, -3, 0, 0, 0], 1000.0;
    Pressure => pascal, [-1, 1, -2, 0, 0, 0], 1000.0;
    ElectricCharge => coulomb, [0, 0, 1, 1, 0, 0], 1.0;
    ElectricPotential => volt, [2, 1, -3, -1, 0, 0], 1000.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::units::UnitTable;
    use approx::assert_relative_eq;
    use uom::si::{force::kilonewton, length::foot, mass::kilogram, velocity::kilometer_per_hour};

    #[test]
    fn test_length_into_quantity() {
        let q: Quantity = Length::new::<foot>(10.0).into();
        assert_relative_eq!(q.value(), 3.048, max_relative = 1e-12);
        assert_eq!(q.uncertainty(), 0.0);
        assert_eq!(q.dimension().exponents(), [1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_kilogram_based_units_scale_to_grams() {
        let m: Quantity = Mass::new::<kilogram>(2.0).into();
        assert_relative_eq!(m.value(), 2000.0, max_relative = 1e-12);

        let f: Quantity = Force::new::<kilonewton>(1.5).into();
        let table = UnitTable::builtin().unwrap();
        assert_eq!(f.display(&table).to_string(), "1500±0 N");
    }

    #[test]
    fn test_quantity_back_to_uom() {
        let table = UnitTable::builtin().unwrap();
        let speed = Quantity::parse("36km/h", &table).unwrap();

        let velocity = Velocity::try_from(&speed).unwrap();
        assert_relative_eq!(velocity.get::<kilometer_per_hour>(), 36.0, max_relative = 1e-9);

        let force = Quantity::parse("2kN", &table).unwrap();
        let back = Force::try_from(&force).unwrap();
        assert_relative_eq!(back.get::<newton>(), 2000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_mismatched_dimension_is_rejected() {
        let table = UnitTable::builtin().unwrap();
        let time = Quantity::parse("3s", &table).unwrap();
        assert!(matches!(
            Length::try_from(&time),
            Err(QuantityError::DimensionMismatch { .. })
        ));
    }
}
