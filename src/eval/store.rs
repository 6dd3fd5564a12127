use std::collections::BTreeMap;

use crate::types::Quantity;

/// Words with a meaning of their own on the command line or in expressions.
pub const RESERVED_WORDS: &[&str] = &[
    "+", "-", "*", "x", "/", "ans", "neg", "is", "lock", "in", "clear", "list", "constants",
    "units", "help", "quit", "exit",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("\"{0}\" is a reserved word")]
    ReservedName(String),

    #[error("\"{0}\" is not a valid name")]
    InvalidName(String),
}

/// Check that `name` can be used for a label or lock.
///
/// Names may not be reserved words and may not start with anything an
/// expression token could start with (`^`, a sign, a digit or `.`).
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    if RESERVED_WORDS.contains(&name) {
        return Err(StoreError::ReservedName(name.to_string()));
    }
    let valid = match name.chars().next() {
        None => false,
        Some(first) => {
            !(first.is_ascii_digit() || matches!(first, '^' | '-' | '+' | '.' | '±'))
                && !name.chars().any(char::is_whitespace)
        }
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// What a stored name refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Label(&'a Quantity),
    Lock(&'a [String]),
}

/// Per-session named values.
///
/// Labels hold evaluated quantities; locks hold token sequences that are
/// re-evaluated on every reference. A name is never both: storing one kind
/// replaces the other.
#[derive(Debug, Clone, Default)]
pub struct NamedStore {
    labels: BTreeMap<String, Quantity>,
    locks: BTreeMap<String, Vec<String>>,
}

impl NamedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self, name: &str) -> Option<&Quantity> {
        self.labels.get(name)
    }

    pub fn lock(&self, name: &str) -> Option<&[String]> {
        self.locks.get(name).map(Vec::as_slice)
    }

    pub fn get(&self, name: &str) -> Option<Entry<'_>> {
        self.label(name)
            .map(Entry::Label)
            .or_else(|| self.lock(name).map(Entry::Lock))
    }

    pub fn set_label(&mut self, name: &str, value: Quantity) -> Result<(), StoreError> {
        validate_name(name)?;
        self.locks.remove(name);
        self.labels.insert(name.to_string(), value);
        Ok(())
    }

    pub fn set_lock<S: AsRef<str>>(&mut self, name: &str, tokens: &[S]) -> Result<(), StoreError> {
        validate_name(name)?;
        self.labels.remove(name);
        let tokens = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        self.locks.insert(name.to_string(), tokens);
        Ok(())
    }

    /// Remove a label or lock. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.labels.remove(name).is_some() || self.locks.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.locks.clear();
    }

    /// Labels sorted by name
    pub fn labels(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Locks sorted by name
    pub fn locks(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.locks.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.locks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len() + self.locks.len()
    }
}
