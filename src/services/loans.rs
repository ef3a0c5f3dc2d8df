//! Loan management service
//!
//! Every operation that moves stock runs in one transaction: the loan row
//! (when there is one) is locked first, then the toolkit row.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, LoanDetails, LoanQuery, UpdateLoan},
    repository::Repository,
};

use super::stock::{self, LoanState, StockLevel};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    pub async fn search(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.search(query).await
    }

    /// Lend units of a toolkit to a user
    pub async fn create(&self, request: CreateLoan) -> AppResult<LoanDetails> {
        if request.due_date < Utc::now() {
            return Err(AppError::Validation("Due date cannot be in the past".to_string()));
        }
        self.ensure_user(request.user_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        let mut toolkit = self.repository.toolkits.lock(&mut tx, request.toolkit_id).await?;

        let level = stock::reserve(StockLevel::from(&toolkit), request.quantity)?;
        level.apply_to(&mut toolkit);
        self.repository.toolkits.save(&mut tx, &toolkit).await?;

        let loan = self.repository.loans.create(&mut tx, &request).await?;
        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            toolkit_id = toolkit.id,
            user_id = loan.user_id,
            quantity = loan.quantity,
            available = toolkit.available,
            "Loan created"
        );

        self.repository.loans.get_details(loan.id).await
    }

    /// Merge a partial update into a loan and reconcile toolkit stock
    pub async fn update(&self, id: i32, patch: UpdateLoan) -> AppResult<LoanDetails> {
        if let Some(user_id) = patch.user_id {
            self.ensure_user(user_id).await?;
        }

        let mut tx = self.repository.pool.begin().await?;
        let current = self.repository.loans.lock(&mut tx, id).await?;

        if matches!(patch.toolkit_id, Some(toolkit_id) if toolkit_id != current.toolkit_id) {
            return Err(AppError::Validation(
                "A loan cannot be moved to another toolkit".to_string(),
            ));
        }

        let old = LoanState {
            quantity: current.quantity,
            status: current.status,
        };
        let mut loan = current;
        loan.apply(&patch);
        let new = LoanState {
            quantity: loan.quantity,
            status: loan.status,
        };

        match (old.status.is_returned(), new.status.is_returned()) {
            (false, true) if loan.return_date.is_none() => loan.return_date = Some(Utc::now()),
            (true, false) if patch.return_date.is_none() => loan.return_date = None,
            _ => {}
        }

        let mut toolkit = self.repository.toolkits.lock(&mut tx, loan.toolkit_id).await?;
        let before = StockLevel::from(&toolkit);
        let after = stock::reconcile_loan_update(before, old, new)?;
        if after != before {
            after.apply_to(&mut toolkit);
            self.repository.toolkits.save(&mut tx, &toolkit).await?;
        }

        let saved = self.repository.loans.save(&mut tx, &loan).await?;
        tx.commit().await?;

        if old.status != new.status {
            tracing::info!(
                loan_id = saved.id,
                from = %old.status,
                to = %new.status,
                available = after.available,
                "Loan status changed"
            );
        }

        self.repository.loans.get_details(saved.id).await
    }

    /// Soft delete a loan. Units of a loan that is still out go back to the toolkit.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let loan = self.repository.loans.lock(&mut tx, id).await?;

        if !loan.status.is_returned() {
            let mut toolkit = self.repository.toolkits.lock(&mut tx, loan.toolkit_id).await?;
            stock::release(StockLevel::from(&toolkit), loan.quantity).apply_to(&mut toolkit);
            self.repository.toolkits.save(&mut tx, &toolkit).await?;
        }

        self.repository.loans.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(loan_id = id, "Loan deleted");
        Ok(())
    }

    async fn ensure_user(&self, user_id: i32) -> AppResult<()> {
        match self.repository.users.get_by_id(user_id).await {
            Ok(user) if user.is_active => Ok(()),
            Ok(_) => Err(AppError::BusinessRule(format!("User {} is not active", user_id))),
            Err(AppError::NotFound(_)) => {
                Err(AppError::Validation(format!("User {} does not exist", user_id)))
            }
            Err(e) => Err(e),
        }
    }
}
