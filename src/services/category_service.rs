use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{
        categories::{CategoryDeleted, CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        normalize_optional,
        reorder::{MoveRequest, ReorderCategoriesRequest, ReorderOutcome},
    },
    entity::{
        categories::{ActiveModel, Column, Entity as Categories},
        dishes::{Column as DishCol, Entity as Dishes},
    },
    error::{AppError, AppResult},
    middleware::auth::{AdminScope, AuthUser, ensure_restaurant, resolve_admin},
    models::{Category, OrderedEntry},
    ordering::{assign_positions, check_permutation, move_item, next_sort_order, pending_writes},
    response::{ApiResponse, Meta},
    scope::Scope,
    services::restaurant_service::first_restaurant,
    state::AppState,
};

/// Categories of a restaurant; the public restaurant when none is given.
pub async fn list_categories(
    state: &AppState,
    restaurant_id: Option<Uuid>,
) -> AppResult<ApiResponse<CategoryList>> {
    let restaurant_id = match restaurant_id {
        Some(id) => Some(id),
        None => first_restaurant(state).await?.map(|r| r.id),
    };

    let items = match restaurant_id {
        Some(id) => load_categories(state, id).await?,
        None => Vec::new(),
    };

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

/// Ordered categories of one restaurant, read through the view cache.
pub async fn load_categories(state: &AppState, restaurant_id: Uuid) -> AppResult<Vec<Category>> {
    let scope = Scope::Restaurant(restaurant_id);
    if let Some(items) = state.views.categories.get(&scope) {
        tracing::debug!(%restaurant_id, "category view cache hit");
        return Ok(items);
    }

    let ticket = state.views.categories.ticket(&scope);
    let items: Vec<Category> = Categories::find()
        .filter(Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    state.views.categories.put(ticket, scope, items.clone());
    Ok(items)
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let result = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Category::from);
    let result = match result {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Category", result, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    payload.validate()?;
    let admin = resolve_admin(state, user).await?;
    let scope = Scope::Restaurant(admin.restaurant_id);

    let _guard = state.locks.acquire(scope).await;
    let siblings = sibling_orders(&state.orm, admin.restaurant_id).await?;
    let sort_order = next_sort_order(siblings.iter().map(|(_, order)| *order));

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(admin.restaurant_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(normalize_optional(payload.description)),
        icon: Set(normalize_optional(payload.icon)),
        sort_order: Set(sort_order),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    state.views.categories.invalidate(&scope);
    tracing::info!(
        category_id = %category.id,
        restaurant_id = %category.restaurant_id,
        sort_order,
        "category created"
    );

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    payload.validate()?;
    let admin = resolve_admin(state, user).await?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    ensure_restaurant(&admin, existing.restaurant_id)?;

    let mut active: ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(Some(description)));
    }
    if let Some(icon) = payload.icon {
        active.icon = Set(normalize_optional(Some(icon)));
    }

    if !active.is_changed() {
        return Ok(ApiResponse::success(
            "Unchanged",
            Category::from(existing),
            Some(Meta::empty()),
        ));
    }

    let category = active.update(&state.orm).await?;
    state
        .views
        .categories
        .invalidate(&Scope::Restaurant(category.restaurant_id));
    tracing::info!(category_id = %category.id, "category updated");

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

/// Deletes the category; the store cascades to its dishes. Remaining siblings
/// keep their indices.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CategoryDeleted>> {
    let admin = resolve_admin(state, user).await?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    ensure_restaurant(&admin, existing.restaurant_id)?;

    let txn = state.orm.begin().await?;
    let removed_dishes = Dishes::find()
        .filter(DishCol::CategoryId.eq(id))
        .count(&txn)
        .await?;
    let result = Categories::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    state
        .views
        .categories
        .invalidate(&Scope::Restaurant(existing.restaurant_id));
    state.views.invalidate_dishes_of(existing.restaurant_id, id);
    tracing::info!(category_id = %id, removed_dishes, "category deleted");

    Ok(ApiResponse::success(
        "Deleted",
        CategoryDeleted { id, removed_dishes },
        Some(Meta::empty()),
    ))
}

pub async fn reorder_categories(
    state: &AppState,
    user: &AuthUser,
    payload: ReorderCategoriesRequest,
) -> AppResult<ApiResponse<ReorderOutcome>> {
    let admin = resolve_admin(state, user).await?;
    let restaurant_id = requested_restaurant(&admin, payload.restaurant_id)?;

    let _guard = state.locks.acquire(Scope::Restaurant(restaurant_id)).await;
    let stored = sibling_orders(&state.orm, restaurant_id).await?;
    let live: Vec<Uuid> = stored.iter().map(|(id, _)| *id).collect();
    check_permutation(&live, &payload.ordered_ids)?;

    let outcome = persist_order(state, restaurant_id, &stored, &payload.ordered_ids).await?;
    Ok(ApiResponse::success(
        "Categories reordered",
        outcome,
        Some(Meta::empty()),
    ))
}

/// Move one category before or after another, computed against the live order.
pub async fn move_category(
    state: &AppState,
    user: &AuthUser,
    payload: MoveRequest,
) -> AppResult<ApiResponse<ReorderOutcome>> {
    let admin = resolve_admin(state, user).await?;
    let restaurant_id = admin.restaurant_id;

    let _guard = state.locks.acquire(Scope::Restaurant(restaurant_id)).await;
    let stored = sibling_orders(&state.orm, restaurant_id).await?;
    let live: Vec<Uuid> = stored.iter().map(|(id, _)| *id).collect();
    let ordered = move_item(&live, payload.source_id, payload.target_id, payload.placement)?;

    let outcome = persist_order(state, restaurant_id, &stored, &ordered).await?;
    Ok(ApiResponse::success(
        "Category moved",
        outcome,
        Some(Meta::empty()),
    ))
}

fn requested_restaurant(admin: &AdminScope, requested: Option<Uuid>) -> AppResult<Uuid> {
    match requested {
        Some(id) => {
            ensure_restaurant(admin, id)?;
            Ok(id)
        }
        None => Ok(admin.restaurant_id),
    }
}

/// `(id, sort_order)` of every category of the restaurant, in display order.
async fn sibling_orders<C>(conn: &C, restaurant_id: Uuid) -> Result<Vec<(Uuid, i32)>, DbErr>
where
    C: ConnectionTrait,
{
    Categories::find()
        .select_only()
        .column(Column::Id)
        .column(Column::SortOrder)
        .filter(Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::CreatedAt)
        .into_tuple::<(Uuid, i32)>()
        .all(conn)
        .await
}

/// Write the changed indices in one transaction. Caller holds the scope lock.
async fn persist_order(
    state: &AppState,
    restaurant_id: Uuid,
    stored: &[(Uuid, i32)],
    ordered: &[Uuid],
) -> AppResult<ReorderOutcome> {
    let writes = pending_writes(stored, ordered);

    if !writes.is_empty() {
        let txn = state.orm.begin().await?;
        for (id, sort_order) in &writes {
            Categories::update_many()
                .col_expr(Column::SortOrder, Expr::value(*sort_order))
                .filter(Column::Id.eq(*id))
                .filter(Column::RestaurantId.eq(restaurant_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        state
            .views
            .categories
            .invalidate(&Scope::Restaurant(restaurant_id));
        // the menu view is grouped by category order
        state.views.dishes.invalidate(&Scope::Menu(restaurant_id));
    }

    tracing::info!(%restaurant_id, updated = writes.len(), "category order persisted");

    Ok(ReorderOutcome {
        scope_id: restaurant_id,
        updated: writes.len(),
        items: assign_positions(ordered)
            .into_iter()
            .map(|(id, sort_order)| OrderedEntry { id, sort_order })
            .collect(),
    })
}
