//! Switching a split between modes without losing what was entered

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use std::collections::{HashMap, HashSet};

use crate::split::{SplitAllocator, SplitMode, SplitSpec};
use crate::types::Member;

impl SplitAllocator {
    /// Re-derive `spec` in another mode from its current values.
    ///
    /// Converting into [`SplitMode::Equal`] includes every member whose prior
    /// value was positive. When nothing was positive, `previous_included` is
    /// kept, or every member when there is no earlier inclusion set.
    pub fn convert(
        &self,
        spec: &SplitSpec,
        to: SplitMode,
        total: &BigDecimal,
        members: &[Member],
        previous_included: Option<&HashSet<String>>,
    ) -> SplitSpec {
        if spec.mode() == to {
            return spec.clone();
        }

        match to {
            SplitMode::Equal => SplitSpec::Equal {
                included: self.included_from(spec, members, previous_included),
            },
            SplitMode::Exact => SplitSpec::Exact {
                amounts: self.convert_values(spec, to, total, members),
            },
            SplitMode::Percentage => SplitSpec::Percentage {
                percentages: self.convert_values(spec, to, total, members),
            },
            SplitMode::Shares => SplitSpec::Shares {
                shares: self.convert_values(spec, to, total, members),
            },
        }
    }

    fn included_from(
        &self,
        spec: &SplitSpec,
        members: &[Member],
        previous_included: Option<&HashSet<String>>,
    ) -> HashSet<String> {
        let included: HashSet<String> = members
            .iter()
            .filter(|m| spec.value_for(&m.id) > BigDecimal::zero())
            .map(|m| m.id.clone())
            .collect();
        if !included.is_empty() {
            return included;
        }
        previous_included
            .cloned()
            .unwrap_or_else(|| members.iter().map(|m| m.id.clone()).collect())
    }

    fn convert_values(
        &self,
        spec: &SplitSpec,
        to: SplitMode,
        total: &BigDecimal,
        members: &[Member],
    ) -> HashMap<String, BigDecimal> {
        let source_total = spec.total_value(members);
        members
            .iter()
            .map(|m| {
                let value =
                    self.convert_value(spec, to, &spec.value_for(&m.id), &source_total, total);
                (m.id.clone(), value)
            })
            .collect()
    }

    /// Convert one member's value. `source_total` is the sum of the source
    /// mode's values (the included count in equal mode).
    fn convert_value(
        &self,
        spec: &SplitSpec,
        to: SplitMode,
        value: &BigDecimal,
        source_total: &BigDecimal,
        total: &BigDecimal,
    ) -> BigDecimal {
        let hundred = BigDecimal::from(100);
        let round = |v: BigDecimal| v.with_scale_round(self.money_scale(), RoundingMode::HalfUp);

        if value.is_zero() {
            return BigDecimal::zero();
        }

        match (spec.mode(), to) {
            // value is 1 for each included member
            (SplitMode::Equal, SplitMode::Percentage) => &hundred / source_total,
            (SplitMode::Equal, SplitMode::Exact) => round(total / source_total),
            (SplitMode::Equal, SplitMode::Shares) => BigDecimal::from(1),

            (SplitMode::Exact, SplitMode::Percentage) => {
                if total.is_zero() {
                    BigDecimal::zero()
                } else {
                    round((value * &hundred) / total)
                }
            }
            (SplitMode::Exact, SplitMode::Shares) => round(value.clone()),

            (SplitMode::Percentage, SplitMode::Exact) => round((value * total) / &hundred),
            (SplitMode::Percentage, SplitMode::Shares) => {
                value.with_scale_round(0, RoundingMode::HalfUp)
            }

            (SplitMode::Shares, SplitMode::Percentage) => {
                if source_total.is_zero() {
                    BigDecimal::zero()
                } else {
                    round((value * &hundred) / source_total)
                }
            }
            (SplitMode::Shares, SplitMode::Exact) => {
                if source_total.is_zero() {
                    BigDecimal::zero()
                } else {
                    round((value * total) / source_total)
                }
            }

            // Same-mode and into-equal conversions never reach here.
            _ => value.clone(),
        }
    }
}
