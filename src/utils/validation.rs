//! Validation utilities

use bigdecimal::{BigDecimal, Zero};

use crate::split::SplitSpec;
use crate::traits::*;
use crate::trip::ExpenseDraft;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> TripResult<()> {
    if *amount <= BigDecimal::zero() {
        Err(TripError::Validation("Amount must be positive".to_string()))
    } else {
        Ok(())
    }
}

/// Validate an ISO 4217 style currency code
pub fn validate_currency_code(code: &str) -> TripResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(TripError::Validation(format!(
            "Currency code '{}' must be three uppercase letters",
            code
        )));
    }
    Ok(())
}

/// Validate that an expense title is usable
pub fn validate_expense_title(title: &str) -> TripResult<()> {
    if title.trim().is_empty() {
        return Err(TripError::Validation(
            "Expense title cannot be empty".to_string(),
        ));
    }

    if title.len() > 200 {
        return Err(TripError::Validation(
            "Expense title cannot exceed 200 characters".to_string(),
        ));
    }

    Ok(())
}

/// Check a split before submission.
///
/// The allocator computes whatever it is given; this is where an exact split
/// that does not add up to `total`, or percentages that miss 100, are caught.
pub fn validate_split(
    spec: &SplitSpec,
    total: &BigDecimal,
    members: &[Member],
    epsilon: &BigDecimal,
) -> TripResult<()> {
    for id in spec.referenced_ids() {
        if !members.iter().any(|m| &m.id == id) {
            return Err(TripError::MemberNotFound(id.clone()));
        }
    }

    if members
        .iter()
        .any(|m| spec.value_for(&m.id) < BigDecimal::zero())
    {
        return Err(TripError::InvalidSplit(
            "Split values cannot be negative".to_string(),
        ));
    }

    let sum = spec.total_value(members);
    match spec {
        SplitSpec::Equal { .. } => {
            if sum.is_zero() {
                return Err(TripError::InvalidSplit(
                    "Select at least one person".to_string(),
                ));
            }
        }
        SplitSpec::Exact { .. } => {
            let remaining = total - &sum;
            if remaining.abs() > *epsilon {
                return Err(TripError::InvalidSplit(format!(
                    "Exact amounts add up to {} instead of {}",
                    sum, total
                )));
            }
        }
        SplitSpec::Percentage { .. } => {
            if (&sum - BigDecimal::from(100)).abs() > *epsilon {
                return Err(TripError::InvalidSplit(format!(
                    "Percentages add up to {} instead of 100",
                    sum
                )));
            }
        }
        SplitSpec::Shares { shares } => {
            if shares.values().any(|count| !count.is_integer()) {
                return Err(TripError::InvalidSplit(
                    "Shares must be whole numbers".to_string(),
                ));
            }
            if sum.is_zero() {
                return Err(TripError::InvalidSplit(
                    "Total shares must be positive".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Enhanced expense validator with title and currency-code checks on top of
/// the default rules
pub struct EnhancedExpenseValidator {
    inner: DefaultExpenseValidator,
}

impl EnhancedExpenseValidator {
    pub fn new(epsilon: BigDecimal) -> Self {
        Self {
            inner: DefaultExpenseValidator::new(epsilon),
        }
    }
}

impl Default for EnhancedExpenseValidator {
    fn default() -> Self {
        Self {
            inner: DefaultExpenseValidator::default(),
        }
    }
}

impl ExpenseValidator for EnhancedExpenseValidator {
    fn validate_expense(&self, trip: &Trip, draft: &ExpenseDraft) -> TripResult<()> {
        validate_expense_title(&draft.title)?;
        validate_currency_code(&draft.currency)?;
        self.inner.validate_expense(trip, draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn members() -> Vec<Member> {
        vec![Member::new("a", "Asha"), Member::new("b", "Bala")]
    }

    fn check(spec: SplitSpec, total: &str) -> TripResult<()> {
        validate_split(&spec, &dec(total), &members(), &dec("0.01"))
    }

    #[test]
    fn test_exact_must_match_total() {
        let spec = |a: &str, b: &str| SplitSpec::Exact {
            amounts: HashMap::from([("a".to_string(), dec(a)), ("b".to_string(), dec(b))]),
        };
        assert!(check(spec("60", "40"), "100").is_ok());
        assert!(check(spec("33.33", "66.66"), "100").is_ok());
        assert!(matches!(
            check(spec("60", "30"), "100"),
            Err(TripError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_percentages_must_reach_hundred() {
        let spec = |a: &str| SplitSpec::Percentage {
            percentages: HashMap::from([("a".to_string(), dec(a)), ("b".to_string(), dec("50"))]),
        };
        assert!(check(spec("50"), "10").is_ok());
        assert!(check(spec("49"), "10").is_err());
    }

    #[test]
    fn test_degenerate_splits_are_rejected() {
        let nobody = SplitSpec::Equal {
            included: HashSet::new(),
        };
        assert!(matches!(check(nobody, "10"), Err(TripError::InvalidSplit(_))));

        let no_shares = SplitSpec::Shares {
            shares: HashMap::from([("a".to_string(), dec("0"))]),
        };
        assert!(check(no_shares, "10").is_err());

        let negative = SplitSpec::Shares {
            shares: HashMap::from([("a".to_string(), dec("-1")), ("b".to_string(), dec("3"))]),
        };
        assert!(check(negative, "10").is_err());
    }

    #[test]
    fn test_shares_must_be_whole_numbers() {
        let spec = |a: &str| SplitSpec::Shares {
            shares: HashMap::from([("a".to_string(), dec(a)), ("b".to_string(), dec("1"))]),
        };
        assert!(check(spec("2"), "10").is_ok());
        assert!(check(spec("2.00"), "10").is_ok());
        assert!(matches!(
            check(spec("1.5"), "10"),
            Err(TripError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_unknown_member_in_split() {
        let spec = SplitSpec::Equal {
            included: HashSet::from(["zed".to_string()]),
        };
        assert!(matches!(check(spec, "10"), Err(TripError::MemberNotFound(id)) if id == "zed"));
    }

    #[test]
    fn test_field_validators() {
        assert!(validate_positive_amount(&dec("0")).is_err());
        assert!(validate_currency_code("INR").is_ok());
        assert!(validate_currency_code("inr").is_err());
        assert!(validate_expense_title("  ").is_err());
    }
}
