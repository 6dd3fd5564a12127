pub mod conversion;
pub mod quantity;
pub mod units;

pub use quantity::{
    DisplayQuantity, Quantity, QuantityError, QuantityReport, UncertaintyKind, ValueScale,
};
pub use units::{
    BUILTIN_PREFIXES, BUILTIN_UNITS, CanonicalUnit, Dimension, DisplayDimension, DisplayNumber,
    Prefix, TableError, UnitDefinition, UnitError, UnitTable,
};
