//! Core types and data structures for the trip ledger

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::split::SplitSpec;

/// Round an amount to the given scale the way users see it (half away from zero)
pub fn round_money(amount: &BigDecimal, scale: i64) -> BigDecimal {
    amount.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Whether `amount` is within `epsilon` of zero
pub fn is_negligible(amount: &BigDecimal, epsilon: &BigDecimal) -> bool {
    amount.abs() <= *epsilon
}

/// A person taking part in a trip
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Identity reference for the member
    pub id: String,
    /// Name shown in balances and activity
    pub display_name: String,
}

impl Member {
    /// Create a new member
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Group of people sharing expenses, as supplied by the trip collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    /// Currency every balance and settlement is expressed in
    pub base_currency: String,
    /// Currencies expenses may be recorded in (besides the base)
    pub currencies: Vec<String>,
    /// Members in display order; this order drives tie-breaks and residuals
    pub members: Vec<Member>,
    /// Owned by the trip collaborator; the engine only reports settledness
    pub is_settled: bool,
    pub created_at: NaiveDateTime,
}

impl Trip {
    /// Create a new open trip
    pub fn new(
        id: String,
        name: String,
        base_currency: String,
        currencies: Vec<String>,
        members: Vec<Member>,
    ) -> Self {
        Self {
            id,
            name,
            base_currency,
            currencies,
            members,
            is_settled: false,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Look up a member by id
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Whether `member_id` belongs to this trip
    pub fn has_member(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }

    /// Whether expenses may be recorded in `currency`
    pub fn accepts_currency(&self, currency: &str) -> bool {
        currency == self.base_currency || self.currencies.iter().any(|c| c == currency)
    }

    /// Remove a member that no expense or settlement references.
    pub fn remove_member(
        &mut self,
        member_id: &str,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> TripResult<Member> {
        let position = self
            .members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or_else(|| TripError::MemberNotFound(member_id.to_string()))?;

        let in_expense = expenses.iter().any(|e| e.references(member_id));
        let in_settlement = settlements
            .iter()
            .any(|s| s.from_member_id == member_id || s.to_member_id == member_id);
        if in_expense || in_settlement {
            return Err(TripError::MemberReferenced(member_id.to_string()));
        }

        Ok(self.members.remove(position))
    }
}

/// Expense categories used for spend reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Activities,
    #[default]
    Other,
}

/// Where the exchange rate of an expense came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Expense is already in the base currency
    Base,
    /// Rate taken from the held rate table
    Table,
    /// No rate was available and the caller accepted a 1:1 assumption
    AssumedParity,
}

/// One member's share of an expense, in base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub member_id: String,
    pub amount_owed: BigDecimal,
    /// Raw percentage or share count, kept for display
    pub share_value: Option<BigDecimal>,
}

impl Split {
    /// Create a split without a share value
    pub fn new(member_id: String, amount_owed: BigDecimal) -> Self {
        Self {
            member_id,
            amount_owed,
            share_value: None,
        }
    }

    /// Attach the raw percentage or share count
    pub fn with_share_value(mut self, share_value: BigDecimal) -> Self {
        self.share_value = Some(share_value);
        self
    }
}

/// A recorded shared expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    /// Member who paid
    pub paid_by: String,
    pub title: String,
    pub category: ExpenseCategory,
    /// Amount in the currency it was paid in
    pub amount: BigDecimal,
    pub currency: String,
    /// Amount converted to the trip base currency
    pub amount_base: BigDecimal,
    /// Multiplier used to obtain `amount_base`
    pub exchange_rate: BigDecimal,
    pub rate_source: RateSource,
    pub split_spec: SplitSpec,
    /// Derived per-member amounts in base currency
    pub splits: Vec<Split>,
    pub expense_date: NaiveDate,
}

impl Expense {
    /// Whether the member paid for or owes part of this expense
    pub fn references(&self, member_id: &str) -> bool {
        self.paid_by == member_id
            || self
                .splits
                .iter()
                .any(|s| s.member_id == member_id && !s.amount_owed.is_zero())
    }

    /// Sum of all split amounts
    pub fn total_owed(&self) -> BigDecimal {
        self.splits.iter().map(|s| &s.amount_owed).sum()
    }

    /// Check that the splits add up to the base amount
    pub fn is_fully_allocated(&self, epsilon: &BigDecimal) -> bool {
        (self.total_owed() - &self.amount_base).abs() <= *epsilon
    }
}

/// Signed net position of a member: positive is owed money, negative owes money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub member_id: String,
    pub display_name: String,
    pub net_amount: BigDecimal,
}

impl Balance {
    /// Whether this member is square within `epsilon`
    pub fn is_settled(&self, epsilon: &BigDecimal) -> bool {
        self.net_amount.abs() <= *epsilon
    }
}

/// A payment the debt simplifier proposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTransfer {
    pub from_member_id: String,
    pub to_member_id: String,
    pub amount: BigDecimal,
    pub currency: String,
}

/// How a settlement was paid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    BankTransfer,
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Other => "Other",
        };
        f.write_str(label)
    }
}

/// A confirmed payment between two members, always in base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub trip_id: String,
    pub from_member_id: String,
    pub to_member_id: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub confirmed_at: NaiveDateTime,
    /// Paid less than suggested, or flagged as an installment by the payer
    pub is_partial: bool,
}

/// Errors that can occur in the trip ledger
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),
    #[error("Member not found: {0}")]
    MemberNotFound(String),
    #[error("Member is referenced by expenses or settlements: {0}")]
    MemberReferenced(String),
    #[error("Exchange rate unavailable for {0}")]
    RateUnavailable(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
}

/// Result type for trip ledger operations
pub type TripResult<T> = Result<T, TripError>;
