use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories::Model as CategoryModel, dishes::Model as DishModel,
    restaurants::Model as RestaurantModel,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Option<String>,
    /// Network name to profile URL.
    pub social_links: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dish {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
    pub image: String,
    pub status: DishStatus,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DishStatus {
    #[default]
    Active,
    Inactive,
}

impl DishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishStatus::Active => "active",
            DishStatus::Inactive => "inactive",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DishStatus::Active => DishStatus::Inactive,
            DishStatus::Inactive => DishStatus::Active,
        }
    }
}

impl fmt::Display for DishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DishStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DishStatus::Active),
            "inactive" => Ok(DishStatus::Inactive),
            other => Err(format!("unknown dish status '{other}'")),
        }
    }
}

/// Current position of a member after a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderedEntry {
    pub id: Uuid,
    pub sort_order: i32,
}

impl From<RestaurantModel> for Restaurant {
    fn from(model: RestaurantModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            banner_image: model.banner_image,
            address: model.address,
            phone: model.phone,
            business_hours: model.business_hours,
            social_links: model
                .social_links
                .and_then(|links| serde_json::from_value(links).ok()),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            icon: model.icon,
            sort_order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<DishModel> for Dish {
    fn from(model: DishModel) -> Self {
        let status = model.status.parse().unwrap_or_else(|err| {
            tracing::warn!(dish_id = %model.id, error = %err, "treating dish as inactive");
            DishStatus::Inactive
        });
        Self {
            id: model.id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            price: model.price,
            image: model.image,
            status,
            sort_order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
