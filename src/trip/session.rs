//! Trip session: local state kept in step with a storage backend

use bigdecimal::BigDecimal;
use tracing::{debug, warn};

use crate::currency::RateTable;
use crate::traits::*;
use crate::trip::{apply_optimistic, Command, ExpenseDraft, TripEngine, TripState, TripSummary};
use crate::types::*;

/// One open trip.
///
/// Every mutation is applied to local state first, then persisted. If the
/// backend rejects the write, local state is rolled back to the snapshot taken
/// before the mutation and the error is returned.
pub struct TripSession<S: TripStorage> {
    storage: S,
    engine: TripEngine,
    validator: Box<dyn ExpenseValidator>,
    state: TripState,
}

impl<S: TripStorage> TripSession<S> {
    /// Load a trip with its expenses and settlements
    pub async fn open(storage: S, engine: TripEngine, trip_id: &str) -> TripResult<Self> {
        let trip = storage
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| TripError::TripNotFound(trip_id.to_string()))?;
        let expenses = storage.list_expenses(trip_id).await?;
        let settlements = storage.list_settlements(trip_id).await?;

        debug!(
            trip_id,
            expenses = expenses.len(),
            settlements = settlements.len(),
            "opened trip"
        );
        Ok(Self::from_state(
            storage,
            engine,
            TripState {
                trip,
                expenses,
                settlements,
                rates: None,
            },
        ))
    }

    /// Save a new trip and open it
    pub async fn create(mut storage: S, engine: TripEngine, trip: Trip) -> TripResult<Self> {
        if trip.members.is_empty() {
            return Err(TripError::Validation(
                "A trip needs at least one member".to_string(),
            ));
        }
        crate::utils::validate_currency_code(&trip.base_currency)?;
        storage.save_trip(&trip).await?;
        Ok(Self::from_state(storage, engine, TripState::new(trip)))
    }

    fn from_state(storage: S, engine: TripEngine, state: TripState) -> Self {
        let validator = Box::new(DefaultExpenseValidator::new(engine.config().epsilon.clone()));
        Self {
            storage,
            engine,
            validator,
            state,
        }
    }

    /// Replace the expense validator
    pub fn with_validator(mut self, validator: Box<dyn ExpenseValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn trip(&self) -> &Trip {
        &self.state.trip
    }

    pub fn engine(&self) -> &TripEngine {
        &self.engine
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Balances, suggestions, and totals for the current state
    pub fn summary(&self) -> TripSummary {
        self.engine.summarize(&self.state)
    }

    /// Settlement history, oldest first
    pub fn activity(&self) -> Vec<Settlement> {
        self.engine
            .settlements
            .activity(&self.state.settlements, &self.state.trip.id)
    }

    /// Swap in a freshly fetched rate table.
    ///
    /// Existing expenses keep the rate they were priced with.
    pub async fn replace_rates(&mut self, table: RateTable) -> TripResult<()> {
        if table.base_currency != self.state.trip.base_currency {
            warn!(
                trip_id = %self.state.trip.id,
                table_base = %table.base_currency,
                trip_base = %self.state.trip.base_currency,
                "rate table base differs from trip base"
            );
        }
        self.commit(Command::ReplaceRates(table)).await
    }

    /// Validate, price, and save a new expense
    pub async fn add_expense(
        &mut self,
        draft: ExpenseDraft,
        allow_parity_fallback: bool,
    ) -> TripResult<Expense> {
        let expense = self.price(uuid::Uuid::new_v4().to_string(), &draft, allow_parity_fallback)?;
        self.commit(Command::AddExpense(expense.clone())).await?;
        Ok(expense)
    }

    /// Re-price an existing expense from an edited draft
    pub async fn edit_expense(
        &mut self,
        expense_id: &str,
        draft: ExpenseDraft,
        allow_parity_fallback: bool,
    ) -> TripResult<Expense> {
        if self.state.expense(expense_id).is_none() {
            return Err(TripError::ExpenseNotFound(expense_id.to_string()));
        }
        let expense = self.price(expense_id.to_string(), &draft, allow_parity_fallback)?;
        self.commit(Command::EditExpense(expense.clone())).await?;
        Ok(expense)
    }

    pub async fn delete_expense(&mut self, expense_id: &str) -> TripResult<()> {
        self.commit(Command::DeleteExpense(expense_id.to_string()))
            .await
    }

    /// Confirm a payment against one of the current suggestions
    pub async fn record_settlement(
        &mut self,
        suggestion: &SuggestedTransfer,
        amount_paid: BigDecimal,
        method: PaymentMethod,
        mark_partial: bool,
    ) -> TripResult<Settlement> {
        self.ensure_member(&suggestion.from_member_id)?;
        self.ensure_member(&suggestion.to_member_id)?;

        let settlement = self.engine.settlements.record(
            &self.state.trip.id,
            suggestion,
            amount_paid,
            method,
            mark_partial,
        )?;
        self.commit(Command::RecordSettlement(settlement.clone()))
            .await?;
        self.sync_settled().await;
        Ok(settlement)
    }

    /// Confirm a payment between two members outside the suggestions
    pub async fn record_ad_hoc_settlement(
        &mut self,
        from_member_id: &str,
        to_member_id: &str,
        amount: BigDecimal,
        method: PaymentMethod,
    ) -> TripResult<Settlement> {
        self.ensure_member(from_member_id)?;
        self.ensure_member(to_member_id)?;

        let trip = &self.state.trip;
        let settlement = self.engine.settlements.record_ad_hoc(
            &trip.id,
            from_member_id,
            to_member_id,
            amount,
            &trip.base_currency,
            method,
            &trip.base_currency,
        )?;
        self.commit(Command::RecordSettlement(settlement.clone()))
            .await?;
        self.sync_settled().await;
        Ok(settlement)
    }

    /// Remove a member nobody's expenses or settlements point at
    pub async fn remove_member(&mut self, member_id: &str) -> TripResult<Member> {
        let member = self
            .state
            .trip
            .member(member_id)
            .cloned()
            .ok_or_else(|| TripError::MemberNotFound(member_id.to_string()))?;
        self.commit(Command::RemoveMember(member_id.to_string()))
            .await?;
        Ok(member)
    }

    fn price(
        &self,
        expense_id: String,
        draft: &ExpenseDraft,
        allow_parity_fallback: bool,
    ) -> TripResult<Expense> {
        self.validator.validate_expense(&self.state.trip, draft)?;
        let rates = self.state.rates_or_identity();
        self.engine.build_expense(
            &self.state.trip,
            expense_id,
            draft,
            &rates,
            allow_parity_fallback,
        )
    }

    fn ensure_member(&self, member_id: &str) -> TripResult<()> {
        if self.state.trip.has_member(member_id) {
            Ok(())
        } else {
            Err(TripError::MemberNotFound(member_id.to_string()))
        }
    }

    /// Mark the trip settled once every balance is within epsilon
    async fn sync_settled(&mut self) {
        let balances = self.engine.balances(&self.state);
        let settled = self.engine.settlements.is_fully_settled(&balances);
        if settled == self.state.trip.is_settled {
            return;
        }
        // The settlement itself is already saved; a stale flag is recomputed next time.
        if let Err(err) = self.commit(Command::SetSettled(settled)).await {
            warn!(trip_id = %self.state.trip.id, error = %err, "could not update settled flag");
        }
    }

    async fn commit(&mut self, command: Command) -> TripResult<()> {
        let (next, undo) = apply_optimistic(&self.state, &command)?;
        let trip_changed = next.trip != undo.previous().trip;
        self.state = next;

        if let Err(err) = self.persist(&command, trip_changed).await {
            warn!(
                trip_id = %self.state.trip.id,
                error = %err,
                "write failed, rolling back"
            );
            self.state = undo.restore();
            return Err(err);
        }
        Ok(())
    }

    async fn persist(&mut self, command: &Command, trip_changed: bool) -> TripResult<()> {
        match command {
            Command::AddExpense(expense) => self.storage.save_expense(expense).await?,
            Command::EditExpense(expense) => self.storage.update_expense(expense).await?,
            Command::DeleteExpense(expense_id) => self.storage.delete_expense(expense_id).await?,
            Command::RecordSettlement(settlement) => {
                self.storage.save_settlement(settlement).await?
            }
            Command::RemoveMember(_) | Command::SetSettled(_) | Command::ReplaceRates(_) => {}
        }
        if trip_changed {
            self.storage.save_trip(&self.state.trip).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::SplitSpec;
    use crate::trip::ExpenseDraftBuilder;
    use crate::utils::MemoryStorage;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn trip() -> Trip {
        Trip::new(
            "t1".to_string(),
            "Goa".to_string(),
            "INR".to_string(),
            vec!["USD".to_string()],
            vec![Member::new("a", "Asha"), Member::new("b", "Bilal")],
        )
    }

    async fn session() -> TripSession<MemoryStorage> {
        TripSession::create(MemoryStorage::new(), TripEngine::default(), trip())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_expense_persists() {
        let mut session = session().await;
        let draft =
            ExpenseDraftBuilder::new("Dinner", "a", dec("100"), "INR", &session.trip().members)
                .build();

        let expense = session.add_expense(draft, false).await.unwrap();
        let stored = session.storage().list_expenses("t1").await.unwrap();
        assert_eq!(stored, vec![expense]);
        assert_eq!(session.summary().net_for("b"), Some(&dec("-50")));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let mut session = session().await;
        session.storage().set_offline(true);

        let draft =
            ExpenseDraftBuilder::new("Dinner", "a", dec("100"), "INR", &session.trip().members)
                .build();
        let result = session.add_expense(draft, false).await;

        assert!(matches!(result, Err(TripError::Storage(_))));
        assert!(session.state().expenses.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_storage() {
        let mut session = session().await;
        let draft =
            ExpenseDraftBuilder::new("Dinner", "zed", dec("100"), "INR", &session.trip().members)
                .build();

        assert!(matches!(
            session.add_expense(draft, false).await,
            Err(TripError::MemberNotFound(_))
        ));
        assert!(session.storage().list_expenses("t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_expense_without_rates() {
        let mut session = session().await;
        let draft =
            ExpenseDraftBuilder::new("Taxi", "a", dec("10"), "USD", &session.trip().members)
                .build();

        assert!(matches!(
            session.add_expense(draft.clone(), false).await,
            Err(TripError::RateUnavailable(_))
        ));

        let expense = session.add_expense(draft, true).await.unwrap();
        assert_eq!(expense.rate_source, RateSource::AssumedParity);
        assert_eq!(session.summary().assumed_parity, vec![expense.id]);
    }

    #[tokio::test]
    async fn test_full_settlement_marks_trip_settled() {
        let mut session = session().await;
        let draft =
            ExpenseDraftBuilder::new("Dinner", "a", dec("100"), "INR", &session.trip().members)
                .split(SplitSpec::equal_among(&session.trip().members))
                .build();
        session.add_expense(draft, false).await.unwrap();

        let suggestion = session.summary().suggestions[0].clone();
        session
            .record_settlement(&suggestion, dec("50"), PaymentMethod::Upi, false)
            .await
            .unwrap();

        assert!(session.trip().is_settled);
        assert!(
            session
                .storage()
                .get_trip("t1")
                .await
                .unwrap()
                .unwrap()
                .is_settled
        );
    }
}
