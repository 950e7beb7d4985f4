use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::OrderedEntry, ordering::Placement};

/// Full desired order of a restaurant's categories.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReorderCategoriesRequest {
    /// Defaults to the caller's restaurant.
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,
    pub ordered_ids: Vec<Uuid>,
}

/// Full desired order of one category's dishes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReorderDishesRequest {
    pub category_id: Uuid,
    pub ordered_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveRequest {
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(default)]
    pub placement: Placement,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReorderOutcome {
    /// Restaurant id for categories, category id for dishes.
    pub scope_id: Uuid,
    /// Rows whose index actually changed.
    pub updated: usize,
    pub items: Vec<OrderedEntry>,
}
