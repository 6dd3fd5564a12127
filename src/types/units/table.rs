use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{BASE_COUNT, Dimension};

/// Contents of `assets/units.csv`.
pub const BUILTIN_UNITS: &str = include_str!("../../../assets/units.csv");
/// Contents of `assets/prefixes.csv`.
pub const BUILTIN_PREFIXES: &str = include_str!("../../../assets/prefixes.csv");

/// Error types for loading resource tables
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// A named unit that may appear in unit literals.
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub abbrev: String,
    pub name: String,
    pub description: String,
    pub dimension: Dimension,

    /// Standard metric units are preferred when rendering results
    pub standard: bool,
}

/// Single-character metric prefix, e.g. `k` for 10^3.
#[derive(Debug, Clone)]
pub struct Prefix {
    pub symbol: char,
    pub name: String,
    pub power: i32,
}

impl Prefix {
    pub fn factor(&self) -> f64 {
        10f64.powi(self.power)
    }
}

/// Display form of a dimension: a unit symbol and the scale to divide by.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalUnit {
    pub symbol: String,
    pub scale: f64,
}

#[derive(Debug, Deserialize)]
struct UnitRow {
    abbrev: String,
    name: String,
    description: String,
    m: i32,
    g: i32,
    s: i32,
    #[serde(rename = "A")]
    a: i32,
    #[serde(rename = "K")]
    k: i32,
    cd: i32,
    factor: f64,
    standard: String,
}

#[derive(Debug, Deserialize)]
struct PrefixRow {
    symbol: String,
    name: String,
    power: i32,
}

/// Units and prefixes recognized by the unit parser.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    pub(super) units: Vec<UnitDefinition>,
    index: HashMap<String, usize>,
    pub(super) prefixes: Vec<Prefix>,
}

impl UnitTable {
    /// Build a table from already-constructed definitions. Later duplicates
    /// of an abbreviation are ignored.
    pub fn new(units: Vec<UnitDefinition>, prefixes: Vec<Prefix>) -> Self {
        let mut index = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            index.entry(unit.abbrev.clone()).or_insert(i);
        }

        Self {
            units,
            index,
            prefixes,
        }
    }

    /// The tables shipped in `assets/`.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_readers(BUILTIN_UNITS.as_bytes(), BUILTIN_PREFIXES.as_bytes())
    }

    pub fn from_files(
        units_path: impl AsRef<Path>,
        prefixes_path: impl AsRef<Path>,
    ) -> Result<Self, TableError> {
        let units = File::open(units_path.as_ref())?;
        let prefixes = File::open(prefixes_path.as_ref())?;
        let table = Self::from_readers(units, prefixes)?;
        debug!(
            path = %units_path.as_ref().display(),
            units = table.units.len(),
            "loaded unit table"
        );
        Ok(table)
    }

    pub fn from_readers(units: impl Read, prefixes: impl Read) -> Result<Self, TableError> {
        Ok(Self::new(read_units(units)?, read_prefixes(prefixes)?))
    }

    pub fn get(&self, abbrev: &str) -> Option<&UnitDefinition> {
        self.index.get(abbrev).map(|&i| &self.units[i])
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    /// Resolve how a dimension should be displayed: the first standard unit
    /// with matching exponents, otherwise the base-unit symbol expression.
    pub fn canonical(&self, dimension: &Dimension) -> CanonicalUnit {
        match self.units.iter().find(|u| u.standard && u.dimension == *dimension) {
            Some(unit) => CanonicalUnit {
                symbol: unit.abbrev.clone(),
                scale: unit.dimension.scale(),
            },
            None => CanonicalUnit {
                symbol: dimension.symbol_expression(),
                scale: 1.0,
            },
        }
    }

    /// Formatted listing of every unit, one per line.
    pub fn describe(&self) -> String {
        let mut out = format!("{:>25}  {:<15}{}", "Name:", "Abbreviation:", "Description:");
        for unit in &self.units {
            let _ = write!(out, "\n{:>25}  {:<15}{}", unit.name, unit.abbrev, unit.description);
        }
        out
    }
}

fn read_units(reader: impl Read) -> Result<Vec<UnitDefinition>, TableError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut units = Vec::new();

    for (i, record) in csv.deserialize().enumerate() {
        let row: UnitRow = record?;
        let line = i as u64 + 2;

        if row.abbrev.is_empty() {
            return Err(TableError::InvalidRow {
                line,
                reason: "empty abbreviation".into(),
            });
        }
        if !(row.factor.is_finite() && row.factor > 0.0) {
            return Err(TableError::InvalidRow {
                line,
                reason: format!("scale factor of {} must be positive", row.abbrev),
            });
        }
        let standard = match row.standard.as_str() {
            "T" | "t" => true,
            "F" | "f" | "" => false,
            other => {
                return Err(TableError::InvalidRow {
                    line,
                    reason: format!("standard flag must be T or F, got {}", other),
                });
            }
        };

        let exponents: [i32; BASE_COUNT] = [row.m, row.g, row.s, row.a, row.k, row.cd];
        units.push(UnitDefinition {
            abbrev: row.abbrev,
            name: row.name,
            description: row.description,
            dimension: Dimension::new(exponents, row.factor),
            standard,
        });
    }

    Ok(units)
}

fn read_prefixes(reader: impl Read) -> Result<Vec<Prefix>, TableError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut prefixes = Vec::new();

    for (i, record) in csv.deserialize().enumerate() {
        let row: PrefixRow = record?;
        let mut chars = row.symbol.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(TableError::InvalidRow {
                    line: i as u64 + 2,
                    reason: format!("prefix symbol \"{}\" must be one character", row.symbol),
                });
            }
        };
        prefixes.push(Prefix {
            symbol,
            name: row.name,
            power: row.power,
        });
    }

    Ok(prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_loads() {
        let table = UnitTable::builtin().unwrap();
        assert!(table.get("m").is_some());
        assert!(table.get("Pa").is_some());
        assert!(table.get("furlong").is_none());
        assert!(table.prefixes().iter().any(|p| p.symbol == 'μ' && p.power == -6));
    }

    #[test]
    fn test_canonical_prefers_standard_unit() {
        let table = UnitTable::builtin().unwrap();
        let force = Dimension::new([1, 1, -2, 0, 0, 0], 1.0);

        let canonical = table.canonical(&force);
        assert_eq!(canonical.symbol, "N");
        assert_eq!(canonical.scale, 1000.0);
    }

    #[test]
    fn test_canonical_falls_back_to_symbols() {
        let table = UnitTable::builtin().unwrap();
        let jerk = Dimension::new([1, 0, -3, 0, 0, 0], 1.0);

        let canonical = table.canonical(&jerk);
        assert_eq!(canonical.symbol, "m/s^3");
        assert_eq!(canonical.scale, 1.0);
    }

    #[test]
    fn test_from_files() {
        let mut units = tempfile::NamedTempFile::new().unwrap();
        writeln!(units, "abbrev,name,description,m,g,s,A,K,cd,factor,standard").unwrap();
        writeln!(units, "m,meter,Length,1,0,0,0,0,0,1,T").unwrap();
        writeln!(units, "fur,furlong,Length,1,0,0,0,0,0,201.168,F").unwrap();

        let mut prefixes = tempfile::NamedTempFile::new().unwrap();
        writeln!(prefixes, "symbol,name,power").unwrap();
        writeln!(prefixes, "k,kilo,3").unwrap();

        let table = UnitTable::from_files(units.path(), prefixes.path()).unwrap();
        assert_eq!(table.units().len(), 2);
        assert_eq!(table.get("fur").unwrap().dimension.scale(), 201.168);
        assert_eq!(table.prefixes()[0].factor(), 1000.0);
    }

    #[test]
    fn test_invalid_rows() {
        let units = "abbrev,name,description,m,g,s,A,K,cd,factor,standard\nm,meter,Length,1,0,0,0,0,0,-1,T\n";
        let result = UnitTable::from_readers(units.as_bytes(), "symbol,name,power\n".as_bytes());
        assert!(matches!(result, Err(TableError::InvalidRow { line: 2, .. })));

        let prefixes = "symbol,name,power\nkk,double kilo,6\n";
        let result = UnitTable::from_readers(
            "abbrev,name,description,m,g,s,A,K,cd,factor,standard\n".as_bytes(),
            prefixes.as_bytes(),
        );
        assert!(matches!(result, Err(TableError::InvalidRow { line: 2, .. })));

        let prefixes = "symbol,name,power\nk,kilo,3\nk,kilo,3\nkk,double kilo,6\n";
        let result = UnitTable::from_readers(
            "abbrev,name,description,m,g,s,A,K,cd,factor,standard\n".as_bytes(),
            prefixes.as_bytes(),
        );
        assert!(matches!(result, Err(TableError::InvalidRow { line: 4, .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = UnitTable::from_files("/nonexistent/units.csv", "/nonexistent/prefixes.csv");
        assert!(matches!(result, Err(TableError::Io(_))));
    }
}
