use std::collections::BTreeMap;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::{dto::require_text, error::AppError};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Option<String>,
    /// Replaces the whole map; an empty map clears it.
    pub social_links: Option<BTreeMap<String, String>>,
}

impl UpdateRestaurantRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        Ok(())
    }
}
