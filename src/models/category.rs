//! Category model

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_COLOR: &str = "#6B7280";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Toolkit category. `parent_id` links a category to its parent; roots have none.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Root category with its direct children
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

impl CategoryNode {
    /// Group categories into roots with one level of children, keeping input order.
    /// Children whose parent is not in `categories` are dropped.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
        let (roots, children): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(|c| c.parent_id.is_none());

        roots
            .into_iter()
            .map(|root| {
                let kids = children
                    .iter()
                    .filter(|c| c.parent_id == Some(root.id))
                    .cloned()
                    .collect();
                CategoryNode {
                    category: root,
                    children: kids,
                }
            })
            .collect()
    }
}

/// True when making `parent_id` the parent of `id` would close a loop, i.e.
/// `id` is `parent_id` itself or one of its ancestors in `categories`.
pub fn creates_cycle(categories: &[Category], id: i32, parent_id: i32) -> bool {
    let mut current = Some(parent_id);
    let mut steps = 0;
    while let Some(ancestor) = current {
        if ancestor == id {
            return true;
        }
        // An existing loop elsewhere must not spin forever
        if steps > categories.len() {
            return false;
        }
        steps += 1;
        current = categories
            .iter()
            .find(|c| c.id == ancestor)
            .and_then(|c| c.parent_id);
    }
    false
}

/// Category list filters
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Case-insensitive match on name and description
    pub search_term: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: Option<bool>,
}

/// Create category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Color must be a #RRGGBB hex value"))]
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub sort_order: Option<i32>,
}

/// Update category request. Absent fields are left unchanged; nullable
/// fields may be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[validate(regex(path = *HEX_COLOR, message = "Color must be a #RRGGBB hex value"))]
    pub color: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub icon: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub parent_id: Option<Option<i32>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
