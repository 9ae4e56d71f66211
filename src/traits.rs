//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::trip::ExpenseDraft;
use crate::types::*;

/// Storage abstraction for trip data
///
/// The engine itself never persists anything. A session drives one of these
/// after every mutation so that trips, expenses, and settlements can live in
/// any backend (a REST API, a database, in-memory, etc.).
#[async_trait]
pub trait TripStorage: Send + Sync {
    /// Get a trip by ID
    async fn get_trip(&self, trip_id: &str) -> TripResult<Option<Trip>>;

    /// Save or replace a trip
    async fn save_trip(&mut self, trip: &Trip) -> TripResult<()>;

    /// Save a new expense
    async fn save_expense(&mut self, expense: &Expense) -> TripResult<()>;

    /// Replace an existing expense
    async fn update_expense(&mut self, expense: &Expense) -> TripResult<()>;

    /// Delete an expense
    async fn delete_expense(&mut self, expense_id: &str) -> TripResult<()>;

    /// List the expenses of a trip
    async fn list_expenses(&self, trip_id: &str) -> TripResult<Vec<Expense>>;

    /// Save a confirmed settlement
    async fn save_settlement(&mut self, settlement: &Settlement) -> TripResult<()>;

    /// List the settlements of a trip
    async fn list_settlements(&self, trip_id: &str) -> TripResult<Vec<Settlement>>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense draft before it is priced and saved
    fn validate_expense(&self, trip: &Trip, draft: &ExpenseDraft) -> TripResult<()>;
}

/// Default expense validator: payer, currency, amount, and split checks
pub struct DefaultExpenseValidator {
    epsilon: BigDecimal,
}

impl DefaultExpenseValidator {
    pub fn new(epsilon: BigDecimal) -> Self {
        Self { epsilon }
    }
}

impl Default for DefaultExpenseValidator {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().epsilon)
    }
}

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, trip: &Trip, draft: &ExpenseDraft) -> TripResult<()> {
        crate::utils::validate_positive_amount(&draft.amount)?;

        if !trip.has_member(&draft.paid_by) {
            return Err(TripError::MemberNotFound(draft.paid_by.clone()));
        }

        if !trip.accepts_currency(&draft.currency) {
            return Err(TripError::CurrencyMismatch(format!(
                "{} is not a currency of trip '{}'",
                draft.currency, trip.id
            )));
        }

        crate::utils::validate_split(&draft.split, &draft.amount, &trip.members, &self.epsilon)
    }
}
