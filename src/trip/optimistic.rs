//! Optimistic state transitions with undo

use crate::currency::RateTable;
use crate::types::*;

/// Everything the engine needs to know about one trip
#[derive(Debug, Clone, PartialEq)]
pub struct TripState {
    pub trip: Trip,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
    pub rates: Option<RateTable>,
}

impl TripState {
    pub fn new(trip: Trip) -> Self {
        Self {
            trip,
            expenses: Vec::new(),
            settlements: Vec::new(),
            rates: None,
        }
    }

    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// The held rate table, or an identity table in the trip's base currency
    pub fn rates_or_identity(&self) -> RateTable {
        self.rates
            .clone()
            .unwrap_or_else(|| RateTable::identity(self.trip.base_currency.clone()))
    }
}

/// A user mutation applied to local state before the backend confirms it
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddExpense(Expense),
    EditExpense(Expense),
    DeleteExpense(String),
    RecordSettlement(Settlement),
    RemoveMember(String),
    SetSettled(bool),
    ReplaceRates(RateTable),
}

/// Snapshot taken before a command, restored if persistence fails
#[derive(Debug, Clone)]
pub struct Undo {
    previous: TripState,
}

impl Undo {
    pub fn previous(&self) -> &TripState {
        &self.previous
    }

    pub fn restore(self) -> TripState {
        self.previous
    }
}

/// Apply `command` to a copy of `state`.
///
/// Adding or editing an expense reopens a settled trip. The input state is
/// never modified, so a failed command leaves nothing to undo.
pub fn apply_optimistic(state: &TripState, command: &Command) -> TripResult<(TripState, Undo)> {
    let mut next = state.clone();

    match command {
        Command::AddExpense(expense) => {
            ensure_same_trip(&next.trip, &expense.trip_id)?;
            if next.expense(&expense.id).is_some() {
                return Err(TripError::Validation(format!(
                    "expense '{}' already exists",
                    expense.id
                )));
            }
            next.expenses.push(expense.clone());
            next.trip.is_settled = false;
        }
        Command::EditExpense(expense) => {
            ensure_same_trip(&next.trip, &expense.trip_id)?;
            let slot = next
                .expenses
                .iter_mut()
                .find(|e| e.id == expense.id)
                .ok_or_else(|| TripError::ExpenseNotFound(expense.id.clone()))?;
            *slot = expense.clone();
            next.trip.is_settled = false;
        }
        Command::DeleteExpense(expense_id) => {
            let position = next
                .expenses
                .iter()
                .position(|e| &e.id == expense_id)
                .ok_or_else(|| TripError::ExpenseNotFound(expense_id.clone()))?;
            next.expenses.remove(position);
        }
        Command::RecordSettlement(settlement) => {
            ensure_same_trip(&next.trip, &settlement.trip_id)?;
            if settlement.currency != next.trip.base_currency {
                return Err(TripError::CurrencyMismatch(format!(
                    "settlements are recorded in {}, got {}",
                    next.trip.base_currency, settlement.currency
                )));
            }
            next.settlements.push(settlement.clone());
        }
        Command::RemoveMember(member_id) => {
            next.trip
                .remove_member(member_id, &state.expenses, &state.settlements)?;
        }
        Command::SetSettled(settled) => {
            next.trip.is_settled = *settled;
        }
        Command::ReplaceRates(table) => {
            next.rates = Some(table.clone());
        }
    }

    Ok((
        next,
        Undo {
            previous: state.clone(),
        },
    ))
}

fn ensure_same_trip(trip: &Trip, trip_id: &str) -> TripResult<()> {
    if trip.id == trip_id {
        Ok(())
    } else {
        Err(TripError::TripNotFound(trip_id.to_string()))
    }
}
