//! Toolkit (catalog item) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{ToolkitCondition, ToolkitStatus};

/// Toolkit model from database. `quantity` is the number of units owned,
/// `available` the number not currently on loan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Toolkit {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category_id: i32,
    /// Populated by listing and lookup queries
    #[sqlx(default)]
    pub category_name: Option<String>,
    pub quantity: i32,
    pub available: i32,
    pub unit: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub condition: ToolkitCondition,
    pub status: ToolkitStatus,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Short toolkit representation embedded in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolkitShort {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub available: i32,
    pub status: ToolkitStatus,
}

/// Toolkit list filters (query string or JSON body)
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ToolkitQuery {
    /// Case-insensitive match on name, SKU and description
    pub search_term: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<ToolkitStatus>,
    pub condition: Option<ToolkitCondition>,
    pub brand: Option<String>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Create toolkit request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateToolkit {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "SKU must be 1 to 64 characters"))]
    pub sku: String,
    pub description: Option<String>,
    pub category_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub unit: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub condition: Option<ToolkitCondition>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    pub notes: Option<String>,
}

/// Update toolkit request. Absent fields are left unchanged; nullable
/// fields may be sent as `null` to clear them. `quantity` and `status`
/// go through the stock rules rather than being copied verbatim.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateToolkit {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "SKU must be 1 to 64 characters"))]
    pub sku: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    pub category_id: Option<i32>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    #[validate(length(min = 1, message = "Unit cannot be empty"))]
    pub unit: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub brand: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub model: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub serial_number: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime, nullable)]
    pub purchase_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>, nullable)]
    pub purchase_price: Option<Option<Decimal>>,
    pub condition: Option<ToolkitCondition>,
    pub status: Option<ToolkitStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,
}

/// Stock adjustment request (`PATCH /toolkits/:id/stock`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockAdjustment {
    /// Signed change applied to both `quantity` and `available`
    #[validate(range(min = -1_000_000, max = 1_000_000, message = "Quantity change is out of range"))]
    pub quantity_change: i32,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
    pub notes: Option<String>,
}

impl Toolkit {
    /// Copy every present descriptive field from `patch`.
    /// Stock fields (`quantity`, `available`, `status`) are not touched here.
    pub fn apply(&mut self, patch: &UpdateToolkit) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref sku) = patch.sku {
            self.sku = sku.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(ref unit) = patch.unit {
            self.unit = unit.clone();
        }
        if let Some(ref brand) = patch.brand {
            self.brand = brand.clone();
        }
        if let Some(ref model) = patch.model {
            self.model = model.clone();
        }
        if let Some(ref serial_number) = patch.serial_number {
            self.serial_number = serial_number.clone();
        }
        if let Some(purchase_date) = patch.purchase_date {
            self.purchase_date = purchase_date;
        }
        if let Some(purchase_price) = patch.purchase_price {
            self.purchase_price = purchase_price;
        }
        if let Some(condition) = patch.condition {
            self.condition = condition;
        }
        if let Some(ref image_url) = patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(ref notes) = patch.notes {
            self.notes = notes.clone();
        }
    }

    pub fn short(&self) -> ToolkitShort {
        ToolkitShort {
            id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            available: self.available,
            status: self.status,
        }
    }
}
