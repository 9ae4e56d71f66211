//! Expense drafts as entered by a member, before pricing

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::split::SplitSpec;
use crate::types::*;

/// What a member enters when adding or editing an expense.
///
/// Split values are in the expense currency; they are carried into the base
/// currency when the draft is priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub paid_by: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub category: ExpenseCategory,
    pub split: SplitSpec,
    pub expense_date: NaiveDate,
}

/// Builder for expense drafts
#[derive(Debug)]
pub struct ExpenseDraftBuilder {
    draft: ExpenseDraft,
}

impl ExpenseDraftBuilder {
    /// Start a draft paid by `paid_by`, split equally among `members`
    pub fn new(
        title: impl Into<String>,
        paid_by: impl Into<String>,
        amount: BigDecimal,
        currency: impl Into<String>,
        members: &[Member],
    ) -> Self {
        Self {
            draft: ExpenseDraft {
                title: title.into(),
                paid_by: paid_by.into(),
                amount,
                currency: currency.into(),
                category: ExpenseCategory::default(),
                split: SplitSpec::equal_among(members),
                expense_date: chrono::Utc::now().date_naive(),
            },
        }
    }

    /// Set the category
    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.draft.category = category;
        self
    }

    /// Replace the split specification
    pub fn split(mut self, split: SplitSpec) -> Self {
        self.draft.split = split;
        self
    }

    /// Set the date the expense happened
    pub fn date(mut self, expense_date: NaiveDate) -> Self {
        self.draft.expense_date = expense_date;
        self
    }

    pub fn build(self) -> ExpenseDraft {
        self.draft
    }
}
