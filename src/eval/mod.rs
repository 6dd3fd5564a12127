//! Postfix (reverse-Polish) expression evaluation.
//!
//! Tokens are processed left to right against a single operand stack:
//!
//! - `+ - * x /` pop two operands (the first popped is the right-hand side)
//! - `^<int>` pops one operand and raises it to the power
//! - `neg` pops one operand and negates it
//! - `ans` pushes the previous result
//! - anything else is a constant, a label, a lock, or a quantity literal,
//!   looked up in that order
//!
//! Locks are evaluated as fresh expressions each time they are referenced.
//! The names of locks being expanded are tracked along the current chain, so
//! a lock that reaches itself again fails with
//! [`EvalError::CyclicLockReference`] instead of recursing without bound.

mod constants;
mod store;

pub use constants::{BUILTIN_CONSTANTS, Constant, ConstantTable};
pub use store::{Entry, NamedStore, RESERVED_WORDS, StoreError, validate_name};

use tracing::{debug, warn};

use crate::types::{Quantity, QuantityError, UnitTable};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(
        "Not enough values for \"{operator}\" (make sure all operations have the required number of inputs)"
    )]
    StackUnderflow { operator: String },

    #[error("Empty expression")]
    EmptyExpression,

    #[error("Cyclic lock reference to \"{name}\" ({chain})")]
    CyclicLockReference { name: String, chain: String },

    #[error("Invalid power \"{0}\"")]
    InvalidPower(String),

    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

/// Evaluates token sequences against the tables of one session.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    units: &'a UnitTable,
    constants: &'a ConstantTable,
    store: &'a NamedStore,
    ans: Quantity,
}

impl<'a> Evaluator<'a> {
    pub fn new(units: &'a UnitTable, constants: &'a ConstantTable, store: &'a NamedStore) -> Self {
        Self {
            units,
            constants,
            store,
            ans: Quantity::dimensionless(0.0),
        }
    }

    /// Value pushed by the `ans` keyword.
    pub fn with_ans(mut self, ans: Quantity) -> Self {
        self.ans = ans;
        self
    }

    /// Reduce `tokens` to a single quantity.
    ///
    /// The result is the top of the stack once every token is consumed; any
    /// values left beneath it are discarded.
    pub fn evaluate<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Quantity, EvalError> {
        let mut chain = Vec::new();
        self.reduce(tokens, &mut chain)
    }

    fn reduce<S: AsRef<str>>(
        &self,
        tokens: &[S],
        chain: &mut Vec<String>,
    ) -> Result<Quantity, EvalError> {
        let mut stack: Vec<Quantity> = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            let result = match token {
                "+" | "-" | "*" | "x" | "/" => {
                    let right = pop(&mut stack, token)?;
                    let left = pop(&mut stack, token)?;
                    match token {
                        "+" => left.add(&right)?,
                        "-" => left.subtract(&right)?,
                        "/" => left.divide(&right)?,
                        _ => left.multiply(&right)?,
                    }
                }
                "ans" => self.ans,
                "neg" => pop(&mut stack, token)?.negate(),
                _ if token.starts_with('^') => {
                    let power = parse_power(token)?;
                    pop(&mut stack, token)?.power(power)?
                }
                _ => self.resolve(token, chain)?,
            };
            stack.push(result);
        }

        let result = stack.pop().ok_or(EvalError::EmptyExpression)?;
        if !stack.is_empty() {
            warn!(
                discarded = stack.len(),
                "expression left more than one value; using the last"
            );
        }
        Ok(result)
    }

    fn resolve(&self, token: &str, chain: &mut Vec<String>) -> Result<Quantity, EvalError> {
        if let Some(constant) = self.constants.get(token) {
            return Ok(*constant);
        }
        if let Some(label) = self.store.label(token) {
            return Ok(*label);
        }
        if let Some(tokens) = self.store.lock(token) {
            if chain.iter().any(|name| name == token) {
                let mut cycle = chain.clone();
                cycle.push(token.to_string());
                return Err(EvalError::CyclicLockReference {
                    name: token.to_string(),
                    chain: cycle.join(" -> "),
                });
            }

            debug!(lock = token, depth = chain.len(), "expanding lock");
            chain.push(token.to_string());
            let result = self.reduce(tokens, chain);
            chain.pop();
            return result;
        }

        Ok(Quantity::parse(token, self.units)?)
    }
}

fn pop(stack: &mut Vec<Quantity>, operator: &str) -> Result<Quantity, EvalError> {
    stack.pop().ok_or_else(|| EvalError::StackUnderflow {
        operator: operator.to_string(),
    })
}

fn parse_power(token: &str) -> Result<i32, EvalError> {
    token[1..]
        .parse()
        .map_err(|_| EvalError::InvalidPower(token.to_string()))
}
