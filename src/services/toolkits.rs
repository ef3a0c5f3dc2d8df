//! Toolkit catalog service

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::{PageRequest, Paginated, Pagination},
        toolkit::{CreateToolkit, StockAdjustment, Toolkit, ToolkitQuery, UpdateToolkit},
    },
    repository::Repository,
};

use super::stock::{self, StockLevel};

#[derive(Clone)]
pub struct ToolkitsService {
    repository: Repository,
}

impl ToolkitsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Toolkit> {
        self.repository.toolkits.get_by_id(id).await
    }

    /// Search toolkits with pagination
    pub async fn search(&self, query: &ToolkitQuery) -> AppResult<Paginated<Toolkit>> {
        let page = PageRequest::new(query.page, query.page_size);
        let (toolkits, total) = self.repository.toolkits.search(query, &page).await?;
        Ok(Paginated {
            data: toolkits,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn create(&self, toolkit: CreateToolkit) -> AppResult<Toolkit> {
        self.ensure_category(toolkit.category_id).await?;
        let created = self.repository.toolkits.create(&toolkit).await?;
        tracing::info!(toolkit_id = created.id, sku = %created.sku, quantity = created.quantity, "Toolkit created");
        self.repository.toolkits.get_by_id(created.id).await
    }

    /// Catalog edit. Descriptive fields are merged as sent; `quantity` and
    /// `status` go through the stock rules under the row lock.
    pub async fn update(&self, id: i32, patch: UpdateToolkit) -> AppResult<Toolkit> {
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut tx = self.repository.pool.begin().await?;
        let mut toolkit = self.repository.toolkits.lock(&mut tx, id).await?;

        toolkit.apply(&patch);

        let mut level = StockLevel::from(&toolkit);
        if let Some(quantity) = patch.quantity {
            level = stock::resize(level, quantity)?;
        }
        if let Some(status) = patch.status {
            level = stock::set_status(level, status);
        }
        level.apply_to(&mut toolkit);

        self.repository.toolkits.save(&mut tx, &toolkit).await?;
        tx.commit().await?;

        self.repository.toolkits.get_by_id(id).await
    }

    /// Manual stock correction applied to both counters, clamped at zero
    pub async fn adjust_stock(&self, id: i32, adjustment: StockAdjustment) -> AppResult<Toolkit> {
        let mut tx = self.repository.pool.begin().await?;
        let mut toolkit = self.repository.toolkits.lock(&mut tx, id).await?;

        let before = StockLevel::from(&toolkit);
        let after = stock::adjust(before, adjustment.quantity_change);
        after.apply_to(&mut toolkit);

        self.repository.toolkits.save(&mut tx, &toolkit).await?;
        tx.commit().await?;

        tracing::info!(
            toolkit_id = id,
            change = adjustment.quantity_change,
            reason = %adjustment.reason,
            quantity = after.quantity,
            available = after.available,
            "Stock adjusted"
        );

        self.repository.toolkits.get_by_id(id).await
    }

    /// Soft delete a toolkit with no loans still out
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.toolkits.get_by_id(id).await?;
        let open = self.repository.toolkits.count_open_loans(id).await?;
        if open > 0 {
            return Err(AppError::BusinessRule(format!(
                "Toolkit still has {} loans that are not returned",
                open
            )));
        }
        self.repository.toolkits.delete(id).await?;
        tracing::info!(toolkit_id = id, "Toolkit deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: i32) -> AppResult<()> {
        match self.repository.categories.get_by_id(category_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "Category {} does not exist",
                category_id
            ))),
            Err(e) => Err(e),
        }
    }
}
