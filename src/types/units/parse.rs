//! Unit literal parsing.
//!
//! A literal is `<group>("/"<group>)?` where each group is a run of terms
//! `<prefix>?<abbrev><exponent>?`. Whitespace is ignored. Terms are not
//! delimited, so a group is split with a small dynamic program that picks
//! the segmentation with the fewest terms (`mm` is one millimeter, not
//! meter squared), preferring longer abbreviations on ties (`cd` is candela,
//! `min` is minute).

use super::{Dimension, UnitError, UnitTable};

#[derive(Debug, Clone, Copy)]
struct Term {
    unit: usize,
    prefix_power: i32,
    exponent: i32,
}

#[derive(Debug, Clone, Copy)]
struct Step {
    term: Term,
    next: usize,
    count: usize,
    abbrev_len: usize,
    prefixed: bool,
}

impl Step {
    fn beats(&self, other: &Step) -> bool {
        (self.count, other.abbrev_len, self.prefixed) < (other.count, self.abbrev_len, other.prefixed)
    }
}

impl UnitTable {
    /// Parse a unit literal into a [`Dimension`]. The empty string is
    /// dimensionless.
    pub fn parse(&self, text: &str) -> Result<Dimension, UnitError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let groups: Vec<&str> = compact.split('/').collect();

        if groups.len() > 2 {
            return Err(UnitError::MultipleSlashes(text.to_string()));
        }

        let mut dimension = Dimension::dimensionless();

        for (i, group) in groups.iter().enumerate() {
            if group.is_empty() {
                if groups.len() == 1 {
                    continue;
                }
                return Err(UnitError::MalformedUnit(text.to_string()));
            }
            if *group == "1" {
                continue;
            }

            let sign = if i == 0 { 1 } else { -1 };
            let terms = self
                .segment(group)
                .ok_or_else(|| UnitError::MalformedUnit(text.to_string()))?;

            for term in terms {
                let unit = &self.units[term.unit].dimension;
                let scale = unit.scale() * 10f64.powi(term.prefix_power);
                let factor = Dimension::new(unit.exponents(), scale).power(term.exponent * sign)?;
                dimension = dimension.multiply(&factor)?;
            }
        }

        Ok(dimension)
    }

    fn segment(&self, group: &str) -> Option<Vec<Term>> {
        let len = group.len();
        let mut best: Vec<Option<Step>> = vec![None; len + 1];

        for start in (0..len).rev() {
            if !group.is_char_boundary(start) {
                continue;
            }
            for mut step in self.steps_at(group, start) {
                let rest = if step.next == len {
                    0
                } else {
                    match &best[step.next] {
                        Some(after) => after.count,
                        None => continue,
                    }
                };
                step.count = rest + 1;

                if best[start].as_ref().is_none_or(|current| step.beats(current)) {
                    best[start] = Some(step);
                }
            }
        }

        let mut terms = Vec::new();
        let mut pos = 0;
        while pos < len {
            let step = best[pos]?;
            terms.push(step.term);
            pos = step.next;
        }
        Some(terms)
    }

    /// Every term that can start at `start`, without its count filled in.
    fn steps_at(&self, group: &str, start: usize) -> Vec<Step> {
        let rest = &group[start..];
        let mut heads: Vec<(Option<i32>, &str)> = vec![(None, rest)];
        if let Some(first) = rest.chars().next() {
            for prefix in self.prefixes.iter().filter(|p| p.symbol == first) {
                heads.push((Some(prefix.power), &rest[first.len_utf8()..]));
            }
        }

        let mut steps = Vec::new();
        for (prefix_power, tail) in heads {
            for (index, unit) in self.units.iter().enumerate() {
                if !tail.starts_with(unit.abbrev.as_str()) {
                    continue;
                }
                let consumed = rest.len() - tail.len() + unit.abbrev.len();
                let Some((exponent, used)) = read_exponent(&rest[consumed..]) else {
                    continue;
                };
                steps.push(Step {
                    term: Term {
                        unit: index,
                        prefix_power: prefix_power.unwrap_or(0),
                        exponent,
                    },
                    next: start + consumed + used,
                    count: 0,
                    abbrev_len: unit.abbrev.len(),
                    prefixed: prefix_power.is_some(),
                });
            }
        }
        steps
    }
}

/// Exponent following an abbreviation: nothing (1), a bare digit `2`-`9`, or
/// `^` and a positive integer. Returns the exponent and bytes consumed.
fn read_exponent(text: &str) -> Option<(i32, usize)> {
    if let Some(digits) = text.strip_prefix('^') {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        let exponent: i32 = digits[..end].parse().ok()?;
        return (exponent >= 1).then_some((exponent, end + 1));
    }

    match text.chars().next() {
        Some(c @ '2'..='9') => Some((c as i32 - '0' as i32, 1)),
        Some(c) if c.is_ascii_digit() => None,
        _ => Some((1, 0)),
    }
}
