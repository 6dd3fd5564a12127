use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::types::{Quantity, TableError, UncertaintyKind, UnitTable, ValueScale};

/// Contents of `assets/constants.csv`.
pub const BUILTIN_CONSTANTS: &str = include_str!("../../assets/constants.csv");

/// A named physical or mathematical constant.
#[derive(Debug, Clone)]
pub struct Constant {
    pub abbrev: String,
    pub name: String,
    pub description: String,
    pub quantity: Quantity,
}

#[derive(Debug, Deserialize)]
struct ConstantRow {
    abbrev: String,
    name: String,
    description: String,
    value: f64,

    /// Relative to the value
    uncertainty: f64,
    unit: String,
}

/// Constants available to every expression, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    constants: Vec<Constant>,
    index: HashMap<String, usize>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped in `assets/constants.csv`.
    pub fn builtin(units: &UnitTable) -> Result<Self, TableError> {
        Self::from_reader(BUILTIN_CONSTANTS.as_bytes(), units)
    }

    pub fn from_file(path: impl AsRef<Path>, units: &UnitTable) -> Result<Self, TableError> {
        let table = Self::from_reader(File::open(path.as_ref())?, units)?;
        debug!(
            path = %path.as_ref().display(),
            constants = table.len(),
            "loaded constant table"
        );
        Ok(table)
    }

    /// Rows are `abbrev,name,description,value,uncertainty,unit`; values are
    /// in the row's unit and uncertainties are relative.
    pub fn from_reader(reader: impl Read, units: &UnitTable) -> Result<Self, TableError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();

        for (i, record) in csv.deserialize().enumerate() {
            let row: ConstantRow = record?;
            let line = i as u64 + 2;
            let dimension = units.parse(&row.unit).map_err(|e| TableError::InvalidRow {
                line,
                reason: format!("constant {}: {}", row.abbrev, e),
            })?;

            let quantity = Quantity::with_options(
                row.value,
                row.uncertainty,
                dimension,
                UncertaintyKind::Relative,
                ValueScale::Unit,
            );
            table.insert(Constant {
                abbrev: row.abbrev,
                name: row.name,
                description: row.description,
                quantity,
            });
        }

        Ok(table)
    }

    /// Add a constant, replacing any existing one with the same abbreviation.
    pub fn insert(&mut self, constant: Constant) {
        match self.index.get(&constant.abbrev) {
            Some(&i) => self.constants[i] = constant,
            None => {
                self.index.insert(constant.abbrev.clone(), self.constants.len());
                self.constants.push(constant);
            }
        }
    }

    pub fn get(&self, abbrev: &str) -> Option<&Quantity> {
        self.constant(abbrev).map(|c| &c.quantity)
    }

    pub fn constant(&self, abbrev: &str) -> Option<&Constant> {
        self.index.get(abbrev).map(|&i| &self.constants[i])
    }

    pub fn contains(&self, abbrev: &str) -> bool {
        self.index.contains_key(abbrev)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Formatted listing of every constant with its value.
    pub fn describe(&self, units: &UnitTable) -> String {
        let mut out = format!("{:>28}  {:<15}{}", "Name:", "Abbreviation:", "Value:");
        for constant in &self.constants {
            let _ = write!(
                out,
                "\n{:>28}  {:<15}{}",
                constant.name,
                constant.abbrev,
                constant.quantity.display(units)
            );
        }
        out
    }
}
