//! Recording payments and reporting settlement progress

use bigdecimal::{BigDecimal, Zero};

use crate::types::*;

/// Records confirmed payments and answers whether a trip is square.
///
/// Suggestions are never updated after a payment. The next aggregation picks
/// up the new settlement and the simplifier produces fresh suggestions.
#[derive(Debug, Clone)]
pub struct SettlementLedger {
    epsilon: BigDecimal,
}

impl Default for SettlementLedger {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().epsilon)
    }
}

impl SettlementLedger {
    /// Create a ledger treating amounts within `epsilon` as equal
    pub fn new(epsilon: BigDecimal) -> Self {
        Self { epsilon }
    }

    /// Confirm a payment made against a suggested transfer.
    ///
    /// The settlement is partial when less than the suggestion was paid, or
    /// when the payer flags it as an installment with `mark_partial`. Paying
    /// more than suggested is allowed; the next aggregation reflects the excess.
    pub fn record(
        &self,
        trip_id: &str,
        suggestion: &SuggestedTransfer,
        amount_paid: BigDecimal,
        method: PaymentMethod,
        mark_partial: bool,
    ) -> TripResult<Settlement> {
        if amount_paid <= BigDecimal::zero() {
            return Err(TripError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let is_partial = mark_partial || amount_paid < &suggestion.amount - &self.epsilon;
        let settlement = Settlement {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            from_member_id: suggestion.from_member_id.clone(),
            to_member_id: suggestion.to_member_id.clone(),
            amount: amount_paid,
            currency: suggestion.currency.clone(),
            method,
            confirmed_at: chrono::Utc::now().naive_utc(),
            is_partial,
        };

        tracing::debug!(
            settlement_id = %settlement.id,
            from = %settlement.from_member_id,
            to = %settlement.to_member_id,
            amount = %settlement.amount,
            is_partial,
            "recorded settlement"
        );
        Ok(settlement)
    }

    /// Confirm a payment that was not suggested, e.g. a direct repayment.
    #[allow(clippy::too_many_arguments)]
    pub fn record_ad_hoc(
        &self,
        trip_id: &str,
        from_member_id: &str,
        to_member_id: &str,
        amount: BigDecimal,
        currency: &str,
        method: PaymentMethod,
        base_currency: &str,
    ) -> TripResult<Settlement> {
        if currency != base_currency {
            return Err(TripError::CurrencyMismatch(format!(
                "settlements are recorded in {}, got {}",
                base_currency, currency
            )));
        }
        if from_member_id == to_member_id {
            return Err(TripError::Validation(
                "A member cannot settle with themselves".to_string(),
            ));
        }
        if amount <= BigDecimal::zero() {
            return Err(TripError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        Ok(Settlement {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            from_member_id: from_member_id.to_string(),
            to_member_id: to_member_id.to_string(),
            amount,
            currency: currency.to_string(),
            method,
            confirmed_at: chrono::Utc::now().naive_utc(),
            is_partial: false,
        })
    }

    /// The trip's settlements, oldest first
    pub fn activity(&self, settlements: &[Settlement], trip_id: &str) -> Vec<Settlement> {
        let mut activity: Vec<Settlement> = settlements
            .iter()
            .filter(|s| s.trip_id == trip_id)
            .cloned()
            .collect();
        activity.sort_by_key(|s| s.confirmed_at);
        activity
    }

    /// True when every balance is within epsilon of zero
    pub fn is_fully_settled(&self, balances: &[Balance]) -> bool {
        balances.iter().all(|b| b.is_settled(&self.epsilon))
    }

    /// What is still owed on a suggestion after paying `amount_paid`
    pub fn outstanding(&self, suggestion: &SuggestedTransfer, amount_paid: &BigDecimal) -> BigDecimal {
        let remaining = &suggestion.amount - amount_paid;
        if remaining <= self.epsilon {
            BigDecimal::zero()
        } else {
            remaining
        }
    }
}
