mod dimension;
mod display;
mod parse;
mod table;

pub use dimension::{BASE_COUNT, BASE_SYMBOLS, Dimension};
pub use display::{DisplayDimension, DisplayNumber};
pub use table::{
    BUILTIN_PREFIXES, BUILTIN_UNITS, CanonicalUnit, Prefix, TableError, UnitDefinition, UnitTable,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Can't parse units \"{0}\"")]
    MalformedUnit(String),

    #[error("Units contain multiple slashes (/): \"{0}\"")]
    MultipleSlashes(String),

    #[error("Unit exponent out of range")]
    ExponentOverflow,
}
