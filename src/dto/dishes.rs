use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::require_text,
    error::AppError,
    models::{Dish, DishStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDishRequest {
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Minor currency units, must be positive.
    pub price: i64,
    /// Public URL of an already uploaded image.
    pub image: String,
    pub status: Option<DishStatus>,
}

impl CreateDishRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("title", &self.title)?;
        validate_price(self.price)?;
        require_text("image", &self.image)
    }
}

/// Absent fields are left untouched. Changing `category_id` appends the dish
/// to the end of the target category.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDishRequest {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub status: Option<DishStatus>,
}

impl UpdateDishRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(image) = &self.image {
            require_text("image", image)?;
        }
        Ok(())
    }
}

/// Without `status` the current status is flipped.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDishStatusRequest {
    pub status: Option<DishStatus>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct DishList {
    #[schema(value_type = Vec<Dish>)]
    pub items: Vec<Dish>,
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if price <= 0 {
        return Err(AppError::Validation("price must be greater than 0".into()));
    }
    Ok(())
}
