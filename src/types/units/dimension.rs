use std::hash::{Hash, Hasher};

use super::UnitError;

/// Number of base quantities a dimension is expressed over.
pub const BASE_COUNT: usize = 6;

/// Symbols of the base units, in exponent-vector order.
///
/// Mass is carried in grams so that the metric prefixes apply uniformly.
pub const BASE_SYMBOLS: [&str; BASE_COUNT] = ["m", "g", "s", "A", "K", "cd"];

/// Physical dimension of a quantity: integer exponents over the base units
/// plus the scale factor of the unit it was written in.
///
/// Equality (and hashing) only looks at the exponents, so `km` and `m` are the
/// same dimension with different scales.
#[derive(Debug, Clone, Copy)]
pub struct Dimension {
    exponents: [i32; BASE_COUNT],
    scale: f64,
}

impl Dimension {
    pub fn new(exponents: [i32; BASE_COUNT], scale: f64) -> Self {
        Self { exponents, scale }
    }

    /// The dimensionless unit, scale 1.
    pub fn dimensionless() -> Self {
        Self::new([0; BASE_COUNT], 1.0)
    }

    /// The base unit at `index` in [`BASE_SYMBOLS`] order.
    pub fn base(index: usize) -> Self {
        let mut exponents = [0; BASE_COUNT];
        exponents[index] = 1;
        Self::new(exponents, 1.0)
    }

    pub fn exponents(&self) -> [i32; BASE_COUNT] {
        self.exponents
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Same exponents, scale reset to the base units.
    pub fn to_base(&self) -> Self {
        Self::new(self.exponents, 1.0)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    pub fn multiply(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        let exponents = self.combine(other, i32::checked_add)?;
        Ok(Self::new(exponents, self.scale * other.scale))
    }

    pub fn divide(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        let exponents = self.combine(other, i32::checked_sub)?;
        Ok(Self::new(exponents, self.scale / other.scale))
    }

    /// Raise to an integer power. `power(0)` is dimensionless with scale 1.
    pub fn power(&self, power: i32) -> Result<Dimension, UnitError> {
        if power == 0 {
            return Ok(Self::dimensionless());
        }

        let mut exponents = [0; BASE_COUNT];
        for (out, &e) in exponents.iter_mut().zip(self.exponents.iter()) {
            *out = e.checked_mul(power).ok_or(UnitError::ExponentOverflow)?;
        }

        Ok(Self::new(exponents, self.scale.powi(power)))
    }

    fn combine(
        &self,
        other: &Dimension,
        op: fn(i32, i32) -> Option<i32>,
    ) -> Result<[i32; BASE_COUNT], UnitError> {
        let mut exponents = [0; BASE_COUNT];
        for i in 0..BASE_COUNT {
            exponents[i] = op(self.exponents[i], other.exponents[i])
                .ok_or(UnitError::ExponentOverflow)?;
        }
        Ok(exponents)
    }

    /// Base-unit symbol expression, e.g. `mg/s^2`.
    ///
    /// Exponents of 1 are omitted, an all-zero vector renders as the empty
    /// string and a pure denominator renders as `1/<denominator>`.
    pub fn symbol_expression(&self) -> String {
        let mut numerator = String::new();
        let mut denominator = String::new();

        for (symbol, &exponent) in BASE_SYMBOLS.iter().zip(self.exponents.iter()) {
            let target = match exponent.signum() {
                1 => &mut numerator,
                -1 => &mut denominator,
                _ => continue,
            };
            target.push_str(symbol);
            let power = exponent.unsigned_abs();
            if power > 1 {
                target.push('^');
                target.push_str(&power.to_string());
            }
        }

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => String::new(),
            (false, true) => numerator,
            (true, false) => format!("1/{}", denominator),
            (false, false) => format!("{}/{}", numerator, denominator),
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.exponents == other.exponents
    }
}

impl Eq for Dimension {}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.exponents.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn velocity_in_km_per_h() -> Dimension {
        Dimension::new([1, 0, -1, 0, 0, 0], 1000.0 / 3600.0)
    }

    #[test]
    fn test_equality_ignores_scale() {
        let km = Dimension::new([1, 0, 0, 0, 0, 0], 1000.0);
        let m = Dimension::base(0);
        assert_eq!(km, m);
        assert_ne!(km, Dimension::base(2));
    }

    #[test]
    fn test_multiply_by_inverse_is_dimensionless() {
        let a = velocity_in_km_per_h();
        let inverse = a.power(-1).unwrap();
        let product = a.multiply(&inverse).unwrap();

        assert!(product.is_dimensionless());
        assert_relative_eq!(product.scale(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multiply_then_divide_round_trips() {
        let a = velocity_in_km_per_h();
        let b = Dimension::new([0, 1, 0, 2, 0, -1], 0.001);
        let back = a.multiply(&b).unwrap().divide(&b).unwrap();

        assert_eq!(back, a);
        assert_relative_eq!(back.scale(), a.scale(), max_relative = 1e-12);
    }

    #[test]
    fn test_power_zero_is_unit() {
        let p = velocity_in_km_per_h().power(0).unwrap();
        assert!(p.is_dimensionless());
        assert_eq!(p.scale(), 1.0);
    }

    #[test]
    fn test_power_scales_exponents_and_factor() {
        let cm = Dimension::new([1, 0, 0, 0, 0, 0], 0.01);
        let cubed = cm.power(3).unwrap();
        assert_eq!(cubed.exponents(), [3, 0, 0, 0, 0, 0]);
        assert_relative_eq!(cubed.scale(), 1e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Dimension::new([i32::MAX, 0, 0, 0, 0, 0], 1.0);
        assert!(matches!(big.multiply(&Dimension::base(0)), Err(UnitError::ExponentOverflow)));
        assert!(matches!(big.power(2), Err(UnitError::ExponentOverflow)));
    }

    #[test]
    fn test_symbol_expression() {
        assert_eq!(Dimension::dimensionless().symbol_expression(), "");
        assert_eq!(velocity_in_km_per_h().symbol_expression(), "m/s");
        assert_eq!(
            Dimension::new([2, 1, -3, -1, 0, 0], 1.0).symbol_expression(),
            "m^2g/s^3A"
        );
        assert_eq!(Dimension::new([0, 0, -2, 0, 0, 0], 1.0).symbol_expression(), "1/s^2");
        assert_eq!(Dimension::new([0, 0, 0, 0, 1, 1], 1.0).symbol_expression(), "Kcd");
    }
}
