//! Split specifications, one variant per split mode

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::Member;

/// The four ways an expense can be divided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Equal,
    Exact,
    Percentage,
    Shares,
}

/// How an expense total is divided among members.
///
/// Members without an entry are excluded and owe nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitSpec {
    /// Divide evenly among the included members
    Equal { included: HashSet<String> },
    /// Fixed amounts per member, expected to add up to the total
    Exact { amounts: HashMap<String, BigDecimal> },
    /// Percent per member, expected to add up to 100
    Percentage {
        percentages: HashMap<String, BigDecimal>,
    },
    /// Proportional weights, total must be positive
    Shares { shares: HashMap<String, BigDecimal> },
}

impl SplitSpec {
    /// Equal split across every given member
    pub fn equal_among(members: &[Member]) -> Self {
        SplitSpec::Equal {
            included: members.iter().map(|m| m.id.clone()).collect(),
        }
    }

    /// Mode tag of this specification
    pub fn mode(&self) -> SplitMode {
        match self {
            SplitSpec::Equal { .. } => SplitMode::Equal,
            SplitSpec::Exact { .. } => SplitMode::Exact,
            SplitSpec::Percentage { .. } => SplitMode::Percentage,
            SplitSpec::Shares { .. } => SplitMode::Shares,
        }
    }

    /// The value entered for a member; inclusion counts as 1 in equal mode
    pub fn value_for(&self, member_id: &str) -> BigDecimal {
        match self {
            SplitSpec::Equal { included } => {
                if included.contains(member_id) {
                    BigDecimal::from(1)
                } else {
                    BigDecimal::zero()
                }
            }
            SplitSpec::Exact { amounts: values }
            | SplitSpec::Percentage {
                percentages: values,
            }
            | SplitSpec::Shares { shares: values } => {
                values.get(member_id).cloned().unwrap_or_else(BigDecimal::zero)
            }
        }
    }

    /// Sum of the values entered for the given members
    pub fn total_value(&self, members: &[Member]) -> BigDecimal {
        members.iter().map(|m| self.value_for(&m.id)).sum()
    }

    /// Ids the specification mentions, whether or not they are trip members
    pub fn referenced_ids(&self) -> Vec<&String> {
        match self {
            SplitSpec::Equal { included } => included.iter().collect(),
            SplitSpec::Exact { amounts: values }
            | SplitSpec::Percentage {
                percentages: values,
            }
            | SplitSpec::Shares { shares: values } => values.keys().collect(),
        }
    }

    /// Scale exact amounts by `to / from`, leaving proportional modes untouched.
    ///
    /// Used to carry exact amounts typed in an expense currency into the base currency.
    pub fn rebased(&self, from_total: &BigDecimal, to_total: &BigDecimal) -> Self {
        match self {
            SplitSpec::Exact { amounts } if !from_total.is_zero() => SplitSpec::Exact {
                amounts: amounts
                    .iter()
                    .map(|(id, amount)| (id.clone(), (amount * to_total) / from_total))
                    .collect(),
            },
            other => other.clone(),
        }
    }
}
