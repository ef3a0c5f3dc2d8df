//! Category management service

use crate::{
    error::{AppError, AppResult},
    models::category::{creates_cycle, Category, CategoryNode, CategoryQuery, CreateCategory, UpdateCategory},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn list(&self, query: &CategoryQuery) -> AppResult<Vec<Category>> {
        self.repository.categories.list(query).await
    }

    /// Root categories with their direct children
    pub async fn tree(&self) -> AppResult<Vec<CategoryNode>> {
        let all = self.repository.categories.list(&CategoryQuery::default()).await?;
        Ok(CategoryNode::build_tree(all))
    }

    pub async fn create(&self, category: CreateCategory) -> AppResult<Category> {
        if let Some(parent_id) = category.parent_id {
            self.ensure_parent(parent_id).await?;
        }
        let created = self.repository.categories.create(&category).await?;
        tracing::info!(category_id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, category: UpdateCategory) -> AppResult<Category> {
        if let Some(Some(parent_id)) = category.parent_id {
            if parent_id == id {
                return Err(AppError::Validation("A category cannot be its own parent".to_string()));
            }
            self.ensure_parent(parent_id).await?;
            let all = self.repository.categories.list(&CategoryQuery::default()).await?;
            if creates_cycle(&all, id, parent_id) {
                return Err(AppError::Validation(format!(
                    "Category {} is a descendant of category {}",
                    parent_id, id
                )));
            }
        }
        self.repository.categories.update(id, &category).await
    }

    /// Soft delete a category that no live toolkit or subcategory uses
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.categories.get_by_id(id).await?;
        let dependents = self.repository.categories.count_dependents(id).await?;
        if dependents > 0 {
            return Err(AppError::BusinessRule(
                "Category still has toolkits or subcategories".to_string(),
            ));
        }
        self.repository.categories.delete(id).await
    }

    async fn ensure_parent(&self, parent_id: i32) -> AppResult<()> {
        match self.repository.categories.get_by_id(parent_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "Parent category {} does not exist",
                parent_id
            ))),
            Err(e) => Err(e),
        }
    }
}
