//! Netting expenses and settlements into per-member balances

use bigdecimal::{BigDecimal, Zero};

use crate::types::*;

/// Combines a trip's expenses and settlements into one signed balance per member.
///
/// Balances are derived data: they are recomputed from the complete inputs on
/// every call and never updated incrementally.
#[derive(Debug, Clone, Default)]
pub struct BalanceAggregator;

impl BalanceAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Net balance per member, in member order.
    ///
    /// Ids that appear in expenses or settlements but not in `members` get a
    /// row of their own after the members, so the balances still sum to zero.
    pub fn aggregate(
        &self,
        expenses: &[Expense],
        settlements: &[Settlement],
        members: &[Member],
    ) -> Vec<Balance> {
        let mut balances: Vec<Balance> = members
            .iter()
            .map(|m| Balance {
                member_id: m.id.clone(),
                display_name: m.display_name.clone(),
                net_amount: BigDecimal::zero(),
            })
            .collect();

        for expense in expenses {
            *Self::entry(&mut balances, &expense.paid_by) += &expense.amount_base;
            for split in &expense.splits {
                *Self::entry(&mut balances, &split.member_id) -= &split.amount_owed;
            }
        }

        for settlement in settlements {
            *Self::entry(&mut balances, &settlement.from_member_id) += &settlement.amount;
            *Self::entry(&mut balances, &settlement.to_member_id) -= &settlement.amount;
        }

        tracing::debug!(
            expenses = expenses.len(),
            settlements = settlements.len(),
            members = balances.len(),
            "aggregated balances"
        );
        balances
    }

    fn entry<'a>(balances: &'a mut Vec<Balance>, member_id: &str) -> &'a mut BigDecimal {
        let index = match balances.iter().position(|b| b.member_id == member_id) {
            Some(index) => index,
            None => {
                tracing::warn!(member_id, "balance for id outside the member list");
                balances.push(Balance {
                    member_id: member_id.to_string(),
                    display_name: member_id.to_string(),
                    net_amount: BigDecimal::zero(),
                });
                balances.len() - 1
            }
        };
        &mut balances[index].net_amount
    }
}

/// Sum of all net amounts; zero (within epsilon) for consistent inputs
pub fn total_net(balances: &[Balance]) -> BigDecimal {
    balances.iter().map(|b| &b.net_amount).sum()
}
