//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    trips: Arc<RwLock<HashMap<String, Trip>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    settlements: Arc<RwLock<Vec<Settlement>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            trips: Arc::new(RwLock::new(HashMap::new())),
            expenses: Arc::new(RwLock::new(HashMap::new())),
            settlements: Arc::new(RwLock::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every write fail until switched back, simulating a lost backend
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> TripResult<()> {
        write(&self.trips)?.clear();
        write(&self.expenses)?.clear();
        write(&self.settlements)?.clear();
        Ok(())
    }

    fn ensure_online(&self) -> TripResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(TripError::Storage("storage is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> TripResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| TripError::Storage(format!("lock poisoned: {e}")))
}

fn write<T>(lock: &RwLock<T>) -> TripResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| TripError::Storage(format!("lock poisoned: {e}")))
}

#[async_trait]
impl TripStorage for MemoryStorage {
    async fn get_trip(&self, trip_id: &str) -> TripResult<Option<Trip>> {
        Ok(read(&self.trips)?.get(trip_id).cloned())
    }

    async fn save_trip(&mut self, trip: &Trip) -> TripResult<()> {
        self.ensure_online()?;
        write(&self.trips)?.insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    async fn save_expense(&mut self, expense: &Expense) -> TripResult<()> {
        self.ensure_online()?;
        let mut expenses = write(&self.expenses)?;
        if expenses.contains_key(&expense.id) {
            return Err(TripError::Storage(format!(
                "expense '{}' already exists",
                expense.id
            )));
        }
        expenses.insert(expense.id.clone(), expense.clone());
        Ok(())
    }

    async fn update_expense(&mut self, expense: &Expense) -> TripResult<()> {
        self.ensure_online()?;
        let mut expenses = write(&self.expenses)?;
        if expenses.contains_key(&expense.id) {
            expenses.insert(expense.id.clone(), expense.clone());
            Ok(())
        } else {
            Err(TripError::ExpenseNotFound(expense.id.clone()))
        }
    }

    async fn delete_expense(&mut self, expense_id: &str) -> TripResult<()> {
        self.ensure_online()?;
        if write(&self.expenses)?.remove(expense_id).is_some() {
            Ok(())
        } else {
            Err(TripError::ExpenseNotFound(expense_id.to_string()))
        }
    }

    async fn list_expenses(&self, trip_id: &str) -> TripResult<Vec<Expense>> {
        let expenses = read(&self.expenses)?;
        let mut filtered: Vec<Expense> = expenses
            .values()
            .filter(|e| e.trip_id == trip_id)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            a.expense_date
                .cmp(&b.expense_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(filtered)
    }

    async fn save_settlement(&mut self, settlement: &Settlement) -> TripResult<()> {
        self.ensure_online()?;
        write(&self.settlements)?.push(settlement.clone());
        Ok(())
    }

    async fn list_settlements(&self, trip_id: &str) -> TripResult<Vec<Settlement>> {
        Ok(read(&self.settlements)?
            .iter()
            .filter(|s| s.trip_id == trip_id)
            .cloned()
            .collect())
    }
}
