use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::require_text, error::AppError, models::Category};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    /// Emoji or short glyph shown next to the name.
    pub icon: Option<String>,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name)
    }
}

/// Absent fields are left untouched. Blank `description`/`icon` clear the field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

/// Result of deleting a category. The store removes its dishes with it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDeleted {
    pub id: Uuid,
    pub removed_dishes: u64,
}
