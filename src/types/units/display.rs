use std::fmt;

use super::Dimension;

/// Renders a dimension as its base-unit symbol expression.
#[derive(Debug)]
pub struct DisplayDimension<'a>(pub &'a Dimension);

/// Shortest round-trip form, scientific outside `[1e-3, 1e7)`.
#[derive(Debug, Clone, Copy)]
pub struct DisplayNumber(pub f64);

impl fmt::Display for DisplayDimension<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expression = self.0.symbol_expression();
        if expression.is_empty() {
            write!(f, "(dimensionless)")
        } else {
            write!(f, "{}", expression)
        }
    }
}

impl fmt::Display for DisplayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.abs();
        if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
            write!(f, "{:e}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
