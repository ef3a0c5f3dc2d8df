//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::LoanStatus;
use super::toolkit::ToolkitShort;
use super::user::UserShort;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub toolkit_id: i32,
    pub quantity: i32,
    pub purpose: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
    pub condition_checked: Option<String>,
    pub condition_return: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Loan with borrower and toolkit for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub user: Option<UserShort>,
    pub toolkit: Option<ToolkitShort>,
    pub is_overdue: bool,
}

/// Loan list filters (query string or JSON body)
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub user_id: Option<i32>,
    pub toolkit_id: Option<i32>,
    pub status: Option<LoanStatus>,
    /// Lower bound on borrow date
    pub date_from: Option<DateTime<Utc>>,
    /// Upper bound on borrow date
    pub date_to: Option<DateTime<Utc>>,
    /// Only loans past their due date and not returned
    pub overdue: Option<bool>,
    /// Case-insensitive match on borrower username/full name, toolkit name and purpose
    pub search_term: Option<String>,
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    pub user_id: i32,
    pub toolkit_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    pub due_date: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
    pub condition_checked: Option<String>,
}

/// Update loan request. Absent fields are left unchanged; nullable
/// fields may be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLoan {
    pub user_id: Option<i32>,
    pub toolkit_id: Option<i32>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(length(min = 1, message = "Purpose cannot be empty"))]
    pub purpose: Option<String>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime, nullable)]
    pub return_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<LoanStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub approved_by: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub condition_checked: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub condition_return: Option<Option<String>>,
}

impl Loan {
    /// Copy every present field from `patch`
    pub fn apply(&mut self, patch: &UpdateLoan) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(toolkit_id) = patch.toolkit_id {
            self.toolkit_id = toolkit_id;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(ref purpose) = patch.purpose {
            self.purpose = purpose.clone();
        }
        if let Some(borrow_date) = patch.borrow_date {
            self.borrow_date = borrow_date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(return_date) = patch.return_date {
            self.return_date = return_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ref approved_by) = patch.approved_by {
            self.approved_by = approved_by.clone();
        }
        if let Some(ref notes) = patch.notes {
            self.notes = notes.clone();
        }
        if let Some(ref condition_checked) = patch.condition_checked {
            self.condition_checked = condition_checked.clone();
        }
        if let Some(ref condition_return) = patch.condition_return {
            self.condition_return = condition_return.clone();
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_returned() && self.due_date < now
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn loan(quantity: i32, status: LoanStatus) -> Loan {
        let now = Utc::now();
        Loan {
            id: 11,
            user_id: 2,
            toolkit_id: 1,
            quantity,
            purpose: "Site repair".to_string(),
            borrow_date: now,
            due_date: now + Duration::days(7),
            return_date: None,
            status,
            approved_by: None,
            notes: Some("handle with care".to_string()),
            condition_checked: None,
            condition_return: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn apply_merges_present_fields() {
        let mut current = loan(3, LoanStatus::Borrowed);
        let patch: UpdateLoan =
            serde_json::from_str(r#"{"status": "returned", "condition_return": "good"}"#).unwrap();

        current.apply(&patch);

        assert_eq!(current.status, LoanStatus::Returned);
        assert_eq!(current.condition_return.as_deref(), Some("good"));
        assert_eq!(current.quantity, 3);
        assert_eq!(current.purpose, "Site repair");
        assert_eq!(current.notes.as_deref(), Some("handle with care"));
    }

    #[test]
    fn apply_clears_explicit_null() {
        let mut current = loan(1, LoanStatus::Borrowed);
        let patch: UpdateLoan = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        current.apply(&patch);
        assert_eq!(current.notes, None);
    }

    #[test]
    fn zero_quantity_is_rejected_not_ignored() {
        let patch: UpdateLoan = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert_eq!(patch.quantity, Some(0));
        assert!(patch.validate().is_err());
    }

    #[test]
    fn overdue_requires_past_due_and_not_returned() {
        let now = Utc::now();
        let mut late = loan(1, LoanStatus::Borrowed);
        late.due_date = now - Duration::days(1);
        assert!(late.is_overdue(now));

        late.status = LoanStatus::Returned;
        assert!(!late.is_overdue(now));

        assert!(!loan(1, LoanStatus::Borrowed).is_overdue(now));
    }
}
