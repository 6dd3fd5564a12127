//! Command layer: one interactive session with its own labels, locks and
//! previous answer.
//!
//! A failed command never changes stored state. Labels, locks and `ans` are
//! only written after the expression they depend on evaluated successfully.

mod config;

pub use config::{Config, ConfigError, OutputMode};

use std::fmt::Write as _;

use tracing::debug;

use crate::eval::{ConstantTable, EvalError, Evaluator, NamedStore, StoreError};
use crate::types::{Quantity, QuantityError, QuantityReport, TableError, UnitTable};

/// Usage text printed by `help`.
pub const HELP: &str = include_str!("../../assets/help.txt");

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("\"{0}\" is reserved for a constant")]
    ReservedName(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("No value or lock named \"{0}\"")]
    UnknownName(String),

    #[error("Missing expression after \"{0}\"")]
    MissingExpression(String),

    #[error("{0}")]
    Eval(#[from] EvalError),

    #[error("{0}")]
    Quantity(#[from] QuantityError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    /// `<name> is <expression>`
    Assign { name: &'a str, expression: Vec<&'a str> },
    /// `<name> lock <expression>`
    Lock { name: &'a str, expression: Vec<&'a str> },
    /// `clear <name>`
    Clear { name: &'a str },
    /// `<expression> in <unit>`
    Convert { expression: Vec<&'a str>, unit: &'a str },
    List,
    Constants,
    Units,
    Help,
    Quit,
    Empty,
    Evaluate { expression: Vec<&'a str> },
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Result<Self, SessionError> {
        let args: Vec<&str> = line.split_whitespace().collect();

        let command = match args.as_slice() {
            [] => Command::Empty,
            ["list"] => Command::List,
            ["constants"] => Command::Constants,
            ["units"] => Command::Units,
            ["help"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            [_, keyword] if *keyword == "is" || *keyword == "lock" => {
                return Err(SessionError::MissingExpression(keyword.to_string()));
            }
            [name, "is", expression @ ..] => Command::Assign {
                name: *name,
                expression: expression.to_vec(),
            },
            [name, "lock", expression @ ..] => Command::Lock {
                name: *name,
                expression: expression.to_vec(),
            },
            ["clear", name] => Command::Clear { name: *name },
            [expression @ .., "in", unit] if !expression.is_empty() => Command::Convert {
                expression: expression.to_vec(),
                unit: *unit,
            },
            expression => Command::Evaluate {
                expression: expression.to_vec(),
            },
        };

        Ok(command)
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Quantity(Quantity),
    Converted(QuantityReport),
    Text(String),
    Quit,
    Nothing,
}

/// Tables plus the mutable state of one user.
#[derive(Debug, Clone)]
pub struct Session {
    units: UnitTable,
    constants: ConstantTable,
    store: NamedStore,
    ans: Quantity,
}

impl Session {
    pub fn new(units: UnitTable, constants: ConstantTable) -> Self {
        Self {
            units,
            constants,
            store: NamedStore::new(),
            ans: Quantity::dimensionless(0.0),
        }
    }

    /// Session over the tables shipped in `assets/`.
    pub fn builtin() -> Result<Self, TableError> {
        let units = UnitTable::builtin()?;
        let constants = ConstantTable::builtin(&units)?;
        Ok(Self::new(units, constants))
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let units = config.unit_table()?;
        let constants = config.constant_table(&units)?;
        Ok(Self::new(units, constants))
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn store(&self) -> &NamedStore {
        &self.store
    }

    pub fn ans(&self) -> &Quantity {
        &self.ans
    }

    pub fn evaluate<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Quantity, EvalError> {
        Evaluator::new(&self.units, &self.constants, &self.store)
            .with_ans(self.ans)
            .evaluate(tokens)
    }

    /// Parse and run one input line.
    pub fn execute(&mut self, line: &str) -> Result<Response, SessionError> {
        let command = Command::parse(line)?;
        debug!(?command, "executing");

        match command {
            Command::Assign { name, expression } => {
                self.check_name(name)?;
                let value = self.evaluate(&expression)?;
                self.store.set_label(name, value)?;
                self.ans = value;
                Ok(Response::Quantity(value))
            }
            Command::Lock { name, expression } => {
                self.check_name(name)?;
                self.store.set_lock(name, &expression)?;
                Ok(Response::Text(format!("Locked {}.", name)))
            }
            Command::Clear { name } => {
                if self.store.remove(name) {
                    Ok(Response::Text("Deleted value.".to_string()))
                } else {
                    Err(SessionError::UnknownName(name.to_string()))
                }
            }
            Command::Convert { expression, unit } => {
                let value = self.evaluate(&expression)?;
                let report = value.report_in(&self.units, unit)?;
                self.ans = value;
                Ok(Response::Converted(report))
            }
            Command::List => Ok(Response::Text(self.listing())),
            Command::Constants => Ok(Response::Text(self.constants.describe(&self.units))),
            Command::Units => Ok(Response::Text(self.units.describe())),
            Command::Help => Ok(Response::Text(HELP.trim_end().to_string())),
            Command::Quit => Ok(Response::Quit),
            Command::Empty => Ok(Response::Nothing),
            Command::Evaluate { expression } => {
                let value = self.evaluate(&expression)?;
                self.ans = value;
                Ok(Response::Quantity(value))
            }
        }
    }

    /// Text to print for a response, if any.
    pub fn render(&self, response: &Response, mode: OutputMode) -> Result<Option<String>, SessionError> {
        let text = match (response, mode) {
            (Response::Quantity(q), OutputMode::Text) => q.display(&self.units).to_string(),
            (Response::Quantity(q), OutputMode::Json) => serde_json::to_string(&q.report(&self.units))?,
            (Response::Converted(report), OutputMode::Text) => report.to_string(),
            (Response::Converted(report), OutputMode::Json) => serde_json::to_string(report)?,
            (Response::Text(text), _) => text.clone(),
            (Response::Quit | Response::Nothing, _) => return Ok(None),
        };
        Ok(Some(text))
    }

    fn check_name(&self, name: &str) -> Result<(), SessionError> {
        if self.constants.contains(name) {
            return Err(SessionError::ReservedName(name.to_string()));
        }
        Ok(crate::eval::validate_name(name)?)
    }

    fn listing(&self) -> String {
        if self.store.is_empty() {
            return "No stored values.".to_string();
        }

        let mut out = String::from("List of all values:");
        for (name, value) in self.store.labels() {
            let _ = write!(out, "\n\t\t{} : {}", name, value.display(&self.units));
        }
        for (name, tokens) in self.store.locks() {
            let _ = write!(out, "\n\t\t{} := {}", name, tokens.join(" "));
        }
        out
    }
}
