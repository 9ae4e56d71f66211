//! Reducing balances to a short list of suggested transfers

use bigdecimal::{BigDecimal, Zero};

use crate::types::*;

/// Greedy debt simplification.
///
/// Repeatedly pays the largest creditor from the largest debtor. Every step
/// clears at least one member, so `n` members never need more than `n - 1`
/// transfers. Ties go to whoever comes first in the input.
#[derive(Debug, Clone)]
pub struct DebtSimplifier {
    epsilon: BigDecimal,
}

impl Default for DebtSimplifier {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().epsilon)
    }
}

impl DebtSimplifier {
    /// Create a simplifier treating amounts within `epsilon` of zero as settled
    pub fn new(epsilon: BigDecimal) -> Self {
        Self { epsilon }
    }

    /// Transfers that would bring every balance to zero, in `currency`
    pub fn simplify(&self, balances: &[Balance], currency: &str) -> Vec<SuggestedTransfer> {
        let mut open: Vec<(&str, BigDecimal)> = balances
            .iter()
            .filter(|b| !is_negligible(&b.net_amount, &self.epsilon))
            .map(|b| (b.member_id.as_str(), b.net_amount.clone()))
            .collect();
        let mut transfers = Vec::new();

        loop {
            let (Some(debtor), Some(creditor)) =
                (Self::largest_debtor(&open), Self::largest_creditor(&open))
            else {
                break;
            };

            let owed = open[debtor].1.abs();
            let amount = if owed < open[creditor].1 {
                owed
            } else {
                open[creditor].1.clone()
            };

            open[debtor].1 += &amount;
            open[creditor].1 -= &amount;
            transfers.push(SuggestedTransfer {
                from_member_id: open[debtor].0.to_string(),
                to_member_id: open[creditor].0.to_string(),
                amount,
                currency: currency.to_string(),
            });

            let epsilon = &self.epsilon;
            open.retain(|(_, net)| !is_negligible(net, epsilon));
        }

        tracing::debug!(
            members = balances.len(),
            transfers = transfers.len(),
            "simplified debts"
        );
        transfers
    }

    fn largest_debtor(open: &[(&str, BigDecimal)]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, (_, net)) in open.iter().enumerate() {
            if *net >= BigDecimal::zero() {
                continue;
            }
            if best.map_or(true, |b| *net < open[b].1) {
                best = Some(index);
            }
        }
        best
    }

    fn largest_creditor(open: &[(&str, BigDecimal)]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, (_, net)) in open.iter().enumerate() {
            if *net <= BigDecimal::zero() {
                continue;
            }
            if best.map_or(true, |b| *net > open[b].1) {
                best = Some(index);
            }
        }
        best
    }
}
