use std::sync::LazyLock;

use regex::Regex;

use super::{Quantity, QuantityError};
use crate::types::units::UnitTable;

/// `<mantissa><exp>? (("+-"|"±")<mantissa><exp>?)? <unit>?` where `<exp>` is
/// `E<int>`, `x10^<int>` or `*10^<int>`.
static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+))(?:(?:[x*]10\^|[Ee])(-?[0-9]+))?(?:(?:\+-|±)((?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+))(?:(?:[x*]10\^|[Ee])(-?[0-9]+))?)?(.*)$",
    )
    .expect("quantity literal pattern is valid")
});

impl Quantity {
    /// Parse a literal such as `9.81+-0.02m/s2`, `6.6E-11` or
    /// `3x10^8±2x10^5 m/s`. Missing exponents are 0, missing uncertainty is
    /// 0 and a missing unit is dimensionless.
    pub fn parse(text: &str, table: &UnitTable) -> Result<Quantity, QuantityError> {
        let captures = LITERAL
            .captures(text.trim())
            .ok_or_else(|| QuantityError::MalformedLiteral(text.to_string()))?;

        let group = |i: usize| captures.get(i).map(|m| m.as_str());

        let value = scaled(text, group(1).unwrap_or("0"), group(2))?;
        let uncertainty = match group(3) {
            Some(mantissa) => scaled(text, mantissa, group(4))?,
            None => 0.0,
        };
        let dimension = table.parse(group(5).unwrap_or(""))?;

        let quantity = Quantity::new(value, uncertainty, dimension);
        if quantity.value().is_finite() && quantity.uncertainty().is_finite() {
            Ok(quantity)
        } else {
            Err(QuantityError::NonFiniteResult("parsing"))
        }
    }
}

/// Combine mantissa and decimal exponent through the float parser so the
/// decimal value is rounded once.
fn scaled(text: &str, mantissa: &str, exponent: Option<&str>) -> Result<f64, QuantityError> {
    let literal = format!("{}e{}", mantissa, exponent.unwrap_or("0"));
    literal
        .parse::<f64>()
        .map_err(|_| QuantityError::MalformedLiteral(text.to_string()))
}
