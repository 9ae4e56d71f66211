//! Allocation of an expense total among members

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use crate::split::SplitSpec;
use crate::types::*;

/// Divides expense totals according to a [`SplitSpec`].
///
/// Allocation never validates the specification: exact amounts that do not add
/// up, or percentages that do not reach 100, are computed as given. See
/// [`crate::utils::validate_split`] for the checks callers run before submission.
#[derive(Debug, Clone)]
pub struct SplitAllocator {
    money_scale: i64,
}

impl Default for SplitAllocator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MONEY_SCALE)
    }
}

impl SplitAllocator {
    /// Create an allocator rounding equal shares to `money_scale` decimals
    pub fn new(money_scale: i64) -> Self {
        Self { money_scale }
    }

    /// Decimal places equal shares are rounded to
    pub fn money_scale(&self) -> i64 {
        self.money_scale
    }

    /// Compute one split per member, in member order.
    ///
    /// Returns an empty vector when an equal split includes nobody; callers must
    /// reject such an expense.
    pub fn allocate(&self, total: &BigDecimal, spec: &SplitSpec, members: &[Member]) -> Vec<Split> {
        let splits = match spec {
            SplitSpec::Equal { included } => {
                let weights: Vec<BigDecimal> = members
                    .iter()
                    .map(|m| {
                        if included.contains(&m.id) {
                            BigDecimal::from(1)
                        } else {
                            BigDecimal::zero()
                        }
                    })
                    .collect();
                if weights.iter().all(|w| w.is_zero()) {
                    return Vec::new();
                }
                self.distribute_even(total, &weights)
                    .into_iter()
                    .zip(members)
                    .map(|(amount, m)| Split::new(m.id.clone(), amount))
                    .collect()
            }
            SplitSpec::Exact { amounts } => members
                .iter()
                .map(|m| {
                    let amount = amounts.get(&m.id).cloned().unwrap_or_else(BigDecimal::zero);
                    Split::new(m.id.clone(), amount)
                })
                .collect(),
            SplitSpec::Percentage { percentages } => members
                .iter()
                .map(|m| {
                    let pct = percentages.get(&m.id).cloned().unwrap_or_else(BigDecimal::zero);
                    let owed = (&pct * total) / BigDecimal::from(100);
                    Split::new(m.id.clone(), owed).with_share_value(pct)
                })
                .collect(),
            SplitSpec::Shares { shares } => {
                let total_shares = spec.total_value(members);
                members
                    .iter()
                    .map(|m| {
                        let count = shares.get(&m.id).cloned().unwrap_or_else(BigDecimal::zero);
                        let owed = if total_shares.is_zero() {
                            BigDecimal::zero()
                        } else {
                            (&count * total) / &total_shares
                        };
                        Split::new(m.id.clone(), owed).with_share_value(count)
                    })
                    .collect()
            }
        };

        tracing::debug!(
            mode = ?spec.mode(),
            members = members.len(),
            %total,
            "allocated expense"
        );
        splits
    }

    /// Split `total` evenly across the positive weights.
    ///
    /// Every share is truncated to the money scale. The leftover smallest units
    /// go one each to the included members, starting from the last, so no two
    /// shares differ by more than one unit and the parts add up to the total.
    fn distribute_even(&self, total: &BigDecimal, weights: &[BigDecimal]) -> Vec<BigDecimal> {
        let mut parts = vec![BigDecimal::zero(); weights.len()];
        let included: Vec<usize> = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > BigDecimal::zero())
            .map(|(index, _)| index)
            .collect();
        let Some(&last) = included.last() else {
            return parts;
        };

        let count = BigDecimal::from(included.len() as u64);
        let share = (total / &count).with_scale_round(self.money_scale, RoundingMode::Down);
        let unit = BigDecimal::new(1.into(), self.money_scale);
        let mut residual = total - &share * &count;

        for &index in included.iter().rev() {
            parts[index] = if residual >= unit {
                residual -= &unit;
                &share + &unit
            } else {
                share.clone()
            };
        }
        // Totals finer than the money scale leave dust below one unit.
        parts[last] += residual;
        parts
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
        vec![
            Member::new("a", "Asha"),
            Member::new("b", "Bala"),
            Member::new("c", "Chen"),
        ]
    }

    fn owed(splits: &[Split]) -> Vec<BigDecimal> {
        splits.iter().map(|s| s.amount_owed.clone()).collect()
    }

    #[test]
    fn test_equal_split_residual_goes_to_last_members() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::equal_among(&members());

        let splits = allocator.allocate(&dec("100"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("33.33"), dec("33.33"), dec("33.34")]);

        let splits = allocator.allocate(&dec("200"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("66.66"), dec("66.67"), dec("66.67")]);
    }

    #[test]
    fn test_equal_split_never_owes_negative_or_uneven_amounts() {
        let allocator = SplitAllocator::default();
        let crowd: Vec<Member> = (0..7)
            .map(|i| Member::new(format!("m{i}"), format!("Member {i}")))
            .collect();
        let spec = SplitSpec::equal_among(&crowd);

        let splits = allocator.allocate(&dec("0.04"), &spec, &crowd[..6]);
        assert_eq!(
            owed(&splits),
            vec![dec("0"), dec("0"), dec("0.01"), dec("0.01"), dec("0.01"), dec("0.01")]
        );

        let splits = allocator.allocate(&dec("100"), &spec, &crowd);
        assert_eq!(
            owed(&splits),
            vec![
                dec("14.28"),
                dec("14.28"),
                dec("14.28"),
                dec("14.29"),
                dec("14.29"),
                dec("14.29"),
                dec("14.29"),
            ]
        );

        for total in ["0.01", "0.05", "1", "9.99", "1000.03"] {
            let total = dec(total);
            let owed = owed(&allocator.allocate(&total, &spec, &crowd));
            let sum: BigDecimal = owed.iter().sum();
            assert_eq!(sum, total);
            let min = owed.iter().min().unwrap();
            let max = owed.iter().max().unwrap();
            assert!(*min >= BigDecimal::zero());
            assert!(max - min <= dec("0.01"));
        }
    }

    #[test]
    fn test_equal_split_excludes_members() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Equal {
            included: HashSet::from(["a".to_string(), "b".to_string()]),
        };

        let splits = allocator.allocate(&dec("90"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("45"), dec("45"), dec("0")]);
        assert_eq!(splits[2].member_id, "c");
    }

    #[test]
    fn test_equal_split_with_nobody_included_is_empty() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Equal {
            included: HashSet::from(["stranger".to_string()]),
        };
        assert!(allocator.allocate(&dec("90"), &spec, &members()).is_empty());
    }

    #[test]
    fn test_exact_split_is_verbatim() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Exact {
            amounts: HashMap::from([
                ("a".to_string(), dec("10")),
                ("c".to_string(), dec("25.50")),
            ]),
        };

        // Does not add up to the total; the allocator does not care.
        let splits = allocator.allocate(&dec("100"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("10"), dec("0"), dec("25.50")]);
    }

    #[test]
    fn test_percentage_split_keeps_share_value() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Percentage {
            percentages: HashMap::from([
                ("a".to_string(), dec("50")),
                ("b".to_string(), dec("30")),
                ("c".to_string(), dec("20")),
            ]),
        };

        let splits = allocator.allocate(&dec("250"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("125"), dec("75"), dec("50")]);
        assert_eq!(splits[1].share_value, Some(dec("30")));
    }

    #[test]
    fn test_shares_split_is_proportional() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Shares {
            shares: HashMap::from([
                ("a".to_string(), dec("2")),
                ("b".to_string(), dec("1")),
                ("c".to_string(), dec("1")),
            ]),
        };

        let splits = allocator.allocate(&dec("1000"), &spec, &members());
        assert_eq!(owed(&splits), vec![dec("500"), dec("250"), dec("250")]);
        assert_eq!(splits[0].share_value, Some(dec("2")));
    }

    #[test]
    fn test_zero_total_shares_owe_nothing() {
        let allocator = SplitAllocator::default();
        let spec = SplitSpec::Shares {
            shares: HashMap::new(),
        };

        let splits = allocator.allocate(&dec("1000"), &spec, &members());
        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|s| s.amount_owed.is_zero()));
    }

    #[test]
    fn test_split_sum_matches_total_for_every_mode() {
        let allocator = SplitAllocator::default();
        let epsilon = dec("0.01");
        let members = members();
        let specs = vec![
            SplitSpec::equal_among(&members),
            SplitSpec::Percentage {
                percentages: HashMap::from([
                    ("a".to_string(), dec("33.33")),
                    ("b".to_string(), dec("33.33")),
                    ("c".to_string(), dec("33.34")),
                ]),
            },
            SplitSpec::Shares {
                shares: HashMap::from([
                    ("a".to_string(), dec("1")),
                    ("b".to_string(), dec("1")),
                    ("c".to_string(), dec("1")),
                ]),
            },
        ];

        for total in ["0.01", "10", "99.99", "3486.84", "1000000.07"] {
            let total = dec(total);
            for spec in &specs {
                let sum: BigDecimal = owed(&allocator.allocate(&total, spec, &members))
                    .iter()
                    .sum();
                assert!(
                    (&sum - &total).abs() <= epsilon,
                    "{:?} split of {} summed to {}",
                    spec.mode(),
                    total,
                    sum
                );
            }
        }
    }
}
