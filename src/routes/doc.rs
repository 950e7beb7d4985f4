use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::{CategoryDeleted, CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        dishes::{CreateDishRequest, DishList, UpdateDishRequest, UpdateDishStatusRequest},
        reorder::{MoveRequest, ReorderCategoriesRequest, ReorderDishesRequest, ReorderOutcome},
        restaurant::UpdateRestaurantRequest,
    },
    models::{Category, Dish, DishStatus, OrderedEntry, Restaurant},
    ordering::Placement,
    response::{ApiResponse, Meta},
    routes::{categories, dishes, health, params, restaurant},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        restaurant::get_restaurant,
        restaurant::get_my_restaurant,
        restaurant::update_restaurant,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::reorder_categories,
        categories::move_category,
        dishes::list_dishes,
        dishes::get_dish,
        dishes::create_dish,
        dishes::update_dish,
        dishes::set_dish_status,
        dishes::delete_dish,
        dishes::reorder_dishes,
        dishes::move_dish
    ),
    components(
        schemas(
            Restaurant,
            Category,
            Dish,
            DishStatus,
            OrderedEntry,
            Placement,
            UpdateRestaurantRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CategoryDeleted,
            CreateDishRequest,
            UpdateDishRequest,
            UpdateDishStatusRequest,
            DishList,
            ReorderCategoriesRequest,
            ReorderDishesRequest,
            MoveRequest,
            ReorderOutcome,
            params::CategoryQuery,
            params::DishQuery,
            Meta,
            ApiResponse<Restaurant>,
            ApiResponse<Category>,
            ApiResponse<Dish>,
            ApiResponse<CategoryList>,
            ApiResponse<DishList>,
            ApiResponse<ReorderOutcome>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Restaurant", description = "Restaurant profile endpoints"),
        (name = "Categories", description = "Menu category endpoints"),
        (name = "Dishes", description = "Dish endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
