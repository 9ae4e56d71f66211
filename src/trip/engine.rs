//! The ledger engine: the five components wired from one configuration

use bigdecimal::{BigDecimal, Zero};
use std::collections::HashMap;

use crate::balance::{BalanceAggregator, DebtSimplifier};
use crate::config::EngineConfig;
use crate::currency::{CurrencyNormalizer, RateTable};
use crate::settlement::SettlementLedger;
use crate::split::SplitAllocator;
use crate::trip::{ExpenseDraft, TripState, TripSummary};
use crate::types::*;

/// Pure computation over trip snapshots.
///
/// Holds no trip data of its own; every call works on the inputs it is given.
#[derive(Debug, Clone)]
pub struct TripEngine {
    config: EngineConfig,
    pub allocator: SplitAllocator,
    pub normalizer: CurrencyNormalizer,
    pub aggregator: BalanceAggregator,
    pub simplifier: DebtSimplifier,
    pub settlements: SettlementLedger,
}

impl Default for TripEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TripEngine {
    /// Build every component from `config`
    pub fn new(config: EngineConfig) -> Self {
        Self {
            allocator: SplitAllocator::new(config.money_scale),
            normalizer: CurrencyNormalizer::new(config.rate_stale_after(), config.money_scale),
            aggregator: BalanceAggregator::new(),
            simplifier: DebtSimplifier::new(config.epsilon.clone()),
            settlements: SettlementLedger::new(config.epsilon.clone()),
            config,
        }
    }

    /// Configuration the components were built from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Price a draft into an expense: normalize the amount, then allocate the
    /// base amount among the trip's members.
    ///
    /// Exact split amounts are scaled by the same rate so they still add up to
    /// the base amount.
    pub fn build_expense(
        &self,
        trip: &Trip,
        expense_id: String,
        draft: &ExpenseDraft,
        rates: &RateTable,
        allow_parity_fallback: bool,
    ) -> TripResult<Expense> {
        let normalized =
            self.normalizer
                .normalize(rates, &draft.amount, &draft.currency, allow_parity_fallback)?;

        let base_spec = draft.split.rebased(&draft.amount, &normalized.amount_base);
        let splits = self
            .allocator
            .allocate(&normalized.amount_base, &base_spec, &trip.members);
        if splits.is_empty() {
            return Err(TripError::InvalidSplit(
                "Select at least one person".to_string(),
            ));
        }

        Ok(Expense {
            id: expense_id,
            trip_id: trip.id.clone(),
            paid_by: draft.paid_by.clone(),
            title: draft.title.clone(),
            category: draft.category,
            amount: draft.amount.clone(),
            currency: draft.currency.clone(),
            amount_base: normalized.amount_base,
            exchange_rate: normalized.rate,
            rate_source: normalized.source,
            split_spec: draft.split.clone(),
            splits,
            expense_date: draft.expense_date,
        })
    }

    /// Balances for the snapshot, one per member
    pub fn balances(&self, state: &TripState) -> Vec<Balance> {
        self.aggregator
            .aggregate(&state.expenses, &state.settlements, &state.trip.members)
    }

    /// Everything presentation needs about a trip, recomputed from scratch
    pub fn summarize(&self, state: &TripState) -> TripSummary {
        let balances = self.balances(state);
        let suggestions = self
            .simplifier
            .simplify(&balances, &state.trip.base_currency);
        let is_fully_settled = self.settlements.is_fully_settled(&balances);

        let mut spend_by_category: HashMap<ExpenseCategory, BigDecimal> = HashMap::new();
        for expense in &state.expenses {
            *spend_by_category
                .entry(expense.category)
                .or_insert_with(BigDecimal::zero) += &expense.amount_base;
        }
        let total_spent = state.expenses.iter().map(|e| &e.amount_base).sum();

        let rates_stale = state.rates.as_ref().is_some_and(|table| {
            self.normalizer
                .is_stale(table, &state.trip.base_currency, chrono::Utc::now())
        });
        let assumed_parity = state
            .expenses
            .iter()
            .filter(|e| e.rate_source == RateSource::AssumedParity)
            .map(|e| e.id.clone())
            .collect();

        TripSummary {
            trip_id: state.trip.id.clone(),
            base_currency: state.trip.base_currency.clone(),
            total_spent,
            spend_by_category,
            balances,
            suggestions,
            is_fully_settled,
            rates_stale,
            assumed_parity,
        }
    }
}
