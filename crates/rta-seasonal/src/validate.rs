//! Input-contract checks for seasonal facts.
//!
//! The typed model already makes negative counts and unknown seasons
//! unrepresentable. What remains to check is:
//! - `month` within 1..=12
//! - `department` non-blank
//! - `total_spend` finite and non-negative
//!
//! A season label that disagrees with its month is **not** a violation here;
//! the monthly view derives its own season and the other views trust the
//! label. The ingest quality report surfaces those mismatches instead.

use std::fmt;

use crate::calendar::is_valid_month;
use crate::types::RawSeasonalFact;

/// The specific contract a fact broke.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    MonthOutOfRange(u8),
    EmptyDepartment,
    NegativeSpend(f64),
    NonFiniteSpend,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::MonthOutOfRange(m) => write!(f, "month {m} is outside 1..=12"),
            ViolationKind::EmptyDepartment => write!(f, "department is empty"),
            ViolationKind::NegativeSpend(v) => write!(f, "total_spend {v} is negative"),
            ViolationKind::NonFiniteSpend => write!(f, "total_spend is not finite"),
        }
    }
}

/// One violation, located by the fact's position in the input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
}

/// Every violation found in an input slice, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct FactValidationError {
    violations: Vec<Violation>,
}

impl FactValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for FactValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FACTS_INVALID: {} contract violation(s)",
            self.violations.len()
        )?;
        for v in self.violations.iter().take(8) {
            write!(f, "; fact[{}]: {}", v.index, v.kind)?;
        }
        if self.violations.len() > 8 {
            write!(f, "; ...")?;
        }
        Ok(())
    }
}

impl std::error::Error for FactValidationError {}

/// Check a single fact. Returns every violation it carries.
pub fn check_fact(fact: &RawSeasonalFact) -> Vec<ViolationKind> {
    let mut out = Vec::new();
    if !is_valid_month(fact.month) {
        out.push(ViolationKind::MonthOutOfRange(fact.month));
    }
    if fact.department.trim().is_empty() {
        out.push(ViolationKind::EmptyDepartment);
    }
    if !fact.total_spend.is_finite() {
        out.push(ViolationKind::NonFiniteSpend);
    } else if fact.total_spend < 0.0 {
        out.push(ViolationKind::NegativeSpend(fact.total_spend));
    }
    out
}

/// Validate a whole slice. `Ok(())` when every fact honours the contract.
pub fn validate_facts(facts: &[RawSeasonalFact]) -> Result<(), FactValidationError> {
    let violations: Vec<Violation> = facts
        .iter()
        .enumerate()
        .flat_map(|(index, fact)| {
            check_fact(fact)
                .into_iter()
                .map(move |kind| Violation { index, kind })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(FactValidationError { violations })
    }
}
