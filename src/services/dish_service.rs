use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{
        dishes::{CreateDishRequest, DishList, UpdateDishRequest, UpdateDishStatusRequest},
        normalize_optional,
        reorder::{MoveRequest, ReorderDishesRequest, ReorderOutcome},
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        dishes::{ActiveModel, Column, Entity as Dishes, Model as DishModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AdminScope, AuthUser, ensure_restaurant, resolve_admin},
    models::{Dish, DishStatus, OrderedEntry},
    ordering::{assign_positions, check_permutation, move_item, next_sort_order, pending_writes},
    response::{ApiResponse, Meta},
    routes::params::DishQuery,
    scope::Scope,
    services::restaurant_service::first_restaurant,
    state::AppState,
};

/// Dishes of one category, or of a whole restaurant's menu grouped by category.
///
/// Without a `category_id` the listing covers the given restaurant, or the
/// public one. Only an admin of that restaurant sees unlisted dishes; everyone
/// else gets the active ones whatever `status` they ask for.
pub async fn list_dishes(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: DishQuery,
) -> AppResult<ApiResponse<DishList>> {
    let target = match query.category_id {
        Some(category_id) => Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .map(|category| (category.restaurant_id, Scope::Category(category.id))),
        None => {
            let restaurant_id = match query.restaurant_id {
                Some(id) => Some(id),
                None => first_restaurant(state).await?.map(|r| r.id),
            };
            restaurant_id.map(|id| (id, Scope::Menu(id)))
        }
    };

    let items = match target {
        Some((restaurant_id, scope)) => {
            let status = if manages(state, viewer, restaurant_id).await? {
                query.status
            } else {
                Some(DishStatus::Active)
            };
            let mut items = load_dishes(state, scope).await?;
            if let Some(status) = status {
                items.retain(|dish| dish.status == status);
            }
            items
        }
        None => Vec::new(),
    };

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Dishes", DishList { items }, Some(meta)))
}

/// Ordered dishes of a category, or of a restaurant's menu, read through the
/// view cache.
pub async fn load_dishes(state: &AppState, scope: Scope) -> AppResult<Vec<Dish>> {
    if let Some(items) = state.views.dishes.get(&scope) {
        tracing::debug!(?scope, "dish view cache hit");
        return Ok(items);
    }

    let ticket = state.views.dishes.ticket(&scope);
    let finder = match scope {
        Scope::Category(category_id) => Dishes::find()
            .filter(Column::CategoryId.eq(category_id))
            .order_by_asc(Column::SortOrder),
        Scope::Menu(restaurant_id) => Dishes::find()
            .inner_join(Categories)
            .filter(CategoryCol::RestaurantId.eq(restaurant_id))
            .order_by_asc(CategoryCol::SortOrder)
            .order_by_asc(CategoryCol::CreatedAt)
            .order_by_asc(Column::SortOrder),
        Scope::Restaurant(_) => return Ok(Vec::new()),
    };
    let items: Vec<Dish> = finder
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Dish::from)
        .collect();

    state.views.dishes.put(ticket, scope, items.clone());
    Ok(items)
}

pub async fn get_dish(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Dish>> {
    let result = Dishes::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Dish::from);
    let result = match result {
        Some(d) => d,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Dish", result, None))
}

pub async fn create_dish(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDishRequest,
) -> AppResult<ApiResponse<Dish>> {
    payload.validate()?;
    let admin = resolve_admin(state, user).await?;
    let category = owned_category(state, &admin, payload.category_id)
        .await
        .map_err(|err| match err {
            AppError::NotFound => AppError::Validation("category does not exist".into()),
            other => other,
        })?;

    let _guard = state.locks.acquire(Scope::Category(category.id)).await;
    let siblings = sibling_orders(&state.orm, category.id).await?;
    let sort_order = next_sort_order(siblings.iter().map(|(_, order)| *order));

    let dish = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        title: Set(payload.title.trim().to_string()),
        description: Set(normalize_optional(payload.description)),
        price: Set(payload.price),
        image: Set(payload.image.trim().to_string()),
        status: Set(payload.status.unwrap_or_default().as_str().to_string()),
        sort_order: Set(sort_order),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    state.views.invalidate_dishes_of(category.restaurant_id, category.id);
    tracing::info!(
        dish_id = %dish.id,
        category_id = %dish.category_id,
        sort_order,
        "dish created"
    );

    Ok(ApiResponse::success(
        "Dish created",
        Dish::from(dish),
        Some(Meta::empty()),
    ))
}

/// Persists only the supplied fields. The index changes only when the dish
/// moves to another category, where it is appended at the end.
pub async fn update_dish(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDishRequest,
) -> AppResult<ApiResponse<Dish>> {
    payload.validate()?;
    let admin = resolve_admin(state, user).await?;
    let existing = owned_dish(state, &admin, id).await?;
    let previous_category = existing.category_id;

    let mut active: ActiveModel = existing.clone().into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(Some(description)));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image) = payload.image {
        active.image = Set(image.trim().to_string());
    }
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }

    let target_category = payload
        .category_id
        .filter(|category_id| *category_id != previous_category);

    let dish = match target_category {
        Some(category_id) => {
            let category = owned_category(state, &admin, category_id)
                .await
                .map_err(|err| match err {
                    AppError::NotFound => AppError::Validation("category does not exist".into()),
                    other => other,
                })?;
            let _guard = state.locks.acquire(Scope::Category(category.id)).await;
            let siblings = sibling_orders(&state.orm, category.id).await?;
            active.category_id = Set(category.id);
            active.sort_order = Set(next_sort_order(siblings.iter().map(|(_, order)| *order)));
            active.update(&state.orm).await?
        }
        None if !active.is_changed() => {
            return Ok(ApiResponse::success(
                "Unchanged",
                Dish::from(existing),
                Some(Meta::empty()),
            ));
        }
        None => active.update(&state.orm).await?,
    };

    state
        .views
        .invalidate_dishes_of(admin.restaurant_id, previous_category);
    if dish.category_id != previous_category {
        state
            .views
            .invalidate_dishes_of(admin.restaurant_id, dish.category_id);
    }
    tracing::info!(dish_id = %dish.id, category_id = %dish.category_id, "dish updated");

    Ok(ApiResponse::success(
        "Updated",
        Dish::from(dish),
        Some(Meta::empty()),
    ))
}

/// Set (or flip) the status. The dish keeps its position.
pub async fn set_dish_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDishStatusRequest,
) -> AppResult<ApiResponse<Dish>> {
    let admin = resolve_admin(state, user).await?;
    let existing = owned_dish(state, &admin, id).await?;

    let current = Dish::from(existing.clone()).status;
    let status = payload.status.unwrap_or_else(|| current.toggled());

    let mut active: ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    let dish = active.update(&state.orm).await?;

    state
        .views
        .invalidate_dishes_of(admin.restaurant_id, dish.category_id);
    tracing::info!(dish_id = %dish.id, %status, "dish status changed");

    let message = match status {
        DishStatus::Active => "Dish listed",
        DishStatus::Inactive => "Dish unlisted",
    };
    Ok(ApiResponse::success(
        message,
        Dish::from(dish),
        Some(Meta::empty()),
    ))
}

/// Siblings keep their indices; the gap closes on the next reorder.
pub async fn delete_dish(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let admin = resolve_admin(state, user).await?;
    let existing = owned_dish(state, &admin, id).await?;

    let result = Dishes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state
        .views
        .invalidate_dishes_of(admin.restaurant_id, existing.category_id);
    tracing::info!(dish_id = %id, category_id = %existing.category_id, "dish deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn reorder_dishes(
    state: &AppState,
    user: &AuthUser,
    payload: ReorderDishesRequest,
) -> AppResult<ApiResponse<ReorderOutcome>> {
    let admin = resolve_admin(state, user).await?;
    let category = owned_category(state, &admin, payload.category_id).await?;

    let _guard = state.locks.acquire(Scope::Category(category.id)).await;
    let stored = sibling_orders(&state.orm, category.id).await?;
    let live: Vec<Uuid> = stored.iter().map(|(id, _)| *id).collect();
    check_permutation(&live, &payload.ordered_ids)?;

    let outcome = persist_order(
        state,
        category.restaurant_id,
        category.id,
        &stored,
        &payload.ordered_ids,
    )
    .await?;
    Ok(ApiResponse::success(
        "Dishes reordered",
        outcome,
        Some(Meta::empty()),
    ))
}

/// Move a dish before or after another dish of the same category.
pub async fn move_dish(
    state: &AppState,
    user: &AuthUser,
    payload: MoveRequest,
) -> AppResult<ApiResponse<ReorderOutcome>> {
    let admin = resolve_admin(state, user).await?;
    let source = owned_dish(state, &admin, payload.source_id).await?;
    let category_id = source.category_id;

    let _guard = state.locks.acquire(Scope::Category(category_id)).await;
    let stored = sibling_orders(&state.orm, category_id).await?;
    let live: Vec<Uuid> = stored.iter().map(|(id, _)| *id).collect();
    // a target from another category is not in `live` and is rejected here
    let ordered = move_item(&live, payload.source_id, payload.target_id, payload.placement)?;

    let outcome =
        persist_order(state, admin.restaurant_id, category_id, &stored, &ordered).await?;
    Ok(ApiResponse::success(
        "Dish moved",
        outcome,
        Some(Meta::empty()),
    ))
}

/// Whether `viewer` administers `restaurant_id`. A token without an admin
/// role counts as an anonymous reader.
async fn manages(
    state: &AppState,
    viewer: Option<&AuthUser>,
    restaurant_id: Uuid,
) -> AppResult<bool> {
    let Some(user) = viewer else {
        return Ok(false);
    };
    match resolve_admin(state, user).await {
        Ok(admin) => Ok(admin.restaurant_id == restaurant_id),
        Err(AppError::Forbidden) => Ok(false),
        Err(err) => Err(err),
    }
}

async fn owned_category(
    state: &AppState,
    admin: &AdminScope,
    category_id: Uuid,
) -> AppResult<CategoryModel> {
    let category = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_restaurant(admin, category.restaurant_id)?;
    Ok(category)
}

async fn owned_dish(state: &AppState, admin: &AdminScope, id: Uuid) -> AppResult<DishModel> {
    let found = Dishes::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let (dish, category) = match found {
        Some((dish, Some(category))) => (dish, category),
        _ => return Err(AppError::NotFound),
    };
    ensure_restaurant(admin, category.restaurant_id)?;
    Ok(dish)
}

/// `(id, sort_order)` of every dish of the category, in display order.
async fn sibling_orders<C>(conn: &C, category_id: Uuid) -> Result<Vec<(Uuid, i32)>, DbErr>
where
    C: ConnectionTrait,
{
    Dishes::find()
        .select_only()
        .column(Column::Id)
        .column(Column::SortOrder)
        .filter(Column::CategoryId.eq(category_id))
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::CreatedAt)
        .into_tuple::<(Uuid, i32)>()
        .all(conn)
        .await
}

/// Write the changed indices in one transaction. Caller holds the scope lock.
/// Only rows of `category_id` can be touched.
async fn persist_order(
    state: &AppState,
    restaurant_id: Uuid,
    category_id: Uuid,
    stored: &[(Uuid, i32)],
    ordered: &[Uuid],
) -> AppResult<ReorderOutcome> {
    let writes = pending_writes(stored, ordered);

    if !writes.is_empty() {
        let txn = state.orm.begin().await?;
        for (id, sort_order) in &writes {
            Dishes::update_many()
                .col_expr(Column::SortOrder, Expr::value(*sort_order))
                .filter(Column::Id.eq(*id))
                .filter(Column::CategoryId.eq(category_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        state.views.invalidate_dishes_of(restaurant_id, category_id);
    }

    tracing::info!(%category_id, updated = writes.len(), "dish order persisted");

    Ok(ReorderOutcome {
        scope_id: category_id,
        updated: writes.len(),
        items: assign_positions(ordered)
            .into_iter()
            .map(|(id, sort_order)| OrderedEntry { id, sort_order })
            .collect(),
    })
}
