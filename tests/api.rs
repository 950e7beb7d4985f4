mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use common::{add_category, add_dish, admin_of, seed_restaurant, setup_state, token_for};
use menu_admin_api::{dto::dishes::UpdateDishStatusRequest, services::dish_service};
use http_body_util::BodyExt;
use menu_admin_api::{
    routes::{create_api_router, health},
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .with_state(state)
}

async fn send(app: Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_reports_database_up() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let request = Request::builder().uri("/health").body(Body::empty())?;

    let (status, body) = send(app(state), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["database"], "up");
    Ok(())
}

#[tokio::test]
async fn public_listing_needs_no_token() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let restaurant_id = seed_restaurant(&state, "Bistro").await?;
    let admin = admin_of(&state, restaurant_id).await?;
    let category = add_category(&state, &admin, "Mains").await?;
    add_dish(&state, &admin, category.id, "steak").await?;

    let request = Request::builder().uri("/api/categories").body(Body::empty())?;
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Mains");

    let uri = format!("/api/dishes?category_id={}&status=active", category.id);
    let request = Request::builder().uri(uri).body(Body::empty())?;
    let (status, body) = send(app(state), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "steak");
    assert_eq!(body["data"][0]["status"], "active");
    Ok(())
}

#[tokio::test]
async fn public_dish_listing_shows_only_active_dishes_of_the_public_restaurant(
) -> anyhow::Result<()> {
    let state = setup_state().await?;
    let public_id = seed_restaurant(&state, "Bistro").await?;
    let admin = admin_of(&state, public_id).await?;
    let mains = add_category(&state, &admin, "Mains").await?;
    let steak = add_dish(&state, &admin, mains.id, "steak").await?;
    let hidden = add_dish(&state, &admin, mains.id, "truffle").await?;
    dish_service::set_dish_status(&state, &admin, hidden.id, UpdateDishStatusRequest::default())
        .await?;

    let other_id = seed_restaurant(&state, "Diner").await?;
    let other_admin = admin_of(&state, other_id).await?;
    let sides = add_category(&state, &other_admin, "Sides").await?;
    add_dish(&state, &other_admin, sides.id, "fries").await?;

    let request = Request::builder().uri("/api/dishes").body(Body::empty())?;
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], steak.id.to_string());

    // asking for unlisted dishes without a token still yields active ones
    let request = Request::builder()
        .uri("/api/dishes?status=inactive")
        .body(Body::empty())?;
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], steak.id.to_string());

    let token = token_for(&admin);
    let request = Request::builder()
        .uri("/api/dishes?status=inactive")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], hidden.id.to_string());

    // the other restaurant's admin has no say over this menu
    let token = token_for(&other_admin);
    let request = Request::builder()
        .uri(format!("/api/dishes?restaurant_id={public_id}&status=inactive"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = send(app(state), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], steak.id.to_string());
    Ok(())
}

#[tokio::test]
async fn status_patch_without_body_toggles() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let restaurant_id = seed_restaurant(&state, "Bistro").await?;
    let admin = admin_of(&state, restaurant_id).await?;
    let category = add_category(&state, &admin, "Mains").await?;
    let dish = add_dish(&state, &admin, category.id, "steak").await?;
    let token = token_for(&admin);

    let toggle = || {
        Request::builder()
            .method("PATCH")
            .uri(format!("/api/dishes/{}/status", dish.id))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
    };

    let (status, body) = send(app(state.clone()), toggle()?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dish unlisted");
    assert_eq!(body["data"]["status"], "inactive");

    let (status, body) = send(app(state), toggle()?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    Ok(())
}

#[tokio::test]
async fn mutations_require_a_valid_token() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_restaurant(&state, "Bistro").await?;

    let request = json_request("POST", "/api/categories", None, json!({ "name": "Desserts" }));
    let (status, _) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = json_request(
        "POST",
        "/api/categories",
        Some("not-a-jwt"),
        json!({ "name": "Desserts" }),
    );
    let (status, _) = send(app(state), request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_creates_and_reorders_over_http() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let restaurant_id = seed_restaurant(&state, "Bistro").await?;
    let admin = admin_of(&state, restaurant_id).await?;
    let token = token_for(&admin);

    let mut ids = Vec::new();
    for name in ["Starters", "Mains", "Desserts"] {
        let request = json_request("POST", "/api/categories", Some(&token), json!({ "name": name }));
        let (status, body) = send(app(state.clone()), request).await?;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["data"]["id"].as_str().expect("id").to_string());
    }

    let request = json_request(
        "POST",
        "/api/categories/move",
        Some(&token),
        json!({ "source_id": ids[2], "target_id": ids[0], "placement": "before" }),
    );
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["id"], ids[2].as_str());
    assert_eq!(body["data"]["items"][0]["sort_order"], 0);

    // not a permutation of the live set
    let request = json_request(
        "PUT",
        "/api/categories/order",
        Some(&token),
        json!({ "ordered_ids": [ids[0], ids[1]] }),
    );
    let (status, _) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let request = json_request(
        "POST",
        "/api/dishes",
        Some(&token),
        json!({
            "category_id": ids[0],
            "title": "Bruschetta",
            "price": -1,
            "image": "https://cdn.example.com/bruschetta.jpg"
        }),
    );
    let (status, _) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .uri(format!("/api/categories/{}", ids[1]))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = send(app(state.clone()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed_dishes"], 0);

    let request = Request::builder()
        .uri("/api/restaurant/mine")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = send(app(state), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bistro");
    Ok(())
}
