//! Derived trip report

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Balances, suggestions, and spend totals for one trip snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip_id: String,
    pub base_currency: String,
    /// Sum of all expenses in base currency
    pub total_spent: BigDecimal,
    pub spend_by_category: HashMap<ExpenseCategory, BigDecimal>,
    pub balances: Vec<Balance>,
    pub suggestions: Vec<SuggestedTransfer>,
    pub is_fully_settled: bool,
    /// The held rate table should be refreshed
    pub rates_stale: bool,
    /// Expenses priced with an assumed 1:1 rate
    pub assumed_parity: Vec<String>,
}

impl TripSummary {
    /// Net amount of one member, if they have a balance row
    pub fn net_for(&self, member_id: &str) -> Option<&BigDecimal> {
        self.balances
            .iter()
            .find(|b| b.member_id == member_id)
            .map(|b| &b.net_amount)
    }

    /// Suggested transfers the member should pay
    pub fn pending_payments_for(&self, member_id: &str) -> Vec<&SuggestedTransfer> {
        self.suggestions
            .iter()
            .filter(|s| s.from_member_id == member_id)
            .collect()
    }

    /// Suggested transfers the member should receive
    pub fn incoming_payments_for(&self, member_id: &str) -> Vec<&SuggestedTransfer> {
        self.suggestions
            .iter()
            .filter(|s| s.to_member_id == member_id)
            .collect()
    }

    /// Suggested transfer between two members, if any
    pub fn suggestion_between(&self, from: &str, to: &str) -> Option<&SuggestedTransfer> {
        self.suggestions
            .iter()
            .find(|s| s.from_member_id == from && s.to_member_id == to)
    }
}
