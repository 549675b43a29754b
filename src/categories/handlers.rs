use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateCategoryRequest, UpdateCategoryRequest},
    repo_types::{Category, CategoryPatch, NewCategory},
};
use crate::{
    error::ApiError,
    extract::{non_blank, parse_id, ApiJson},
    repository::Entity,
    response::{created, done, ok, Reply},
    state::AppState,
};

/// Served under both `/category` and `/categories`.
pub fn category_routes() -> Router<AppState> {
    ["/category", "/categories"]
        .into_iter()
        .fold(Router::new(), |router, base| {
            router
                .route(base, get(list_categories).post(create_category))
                .route(
                    &format!("{base}/:id"),
                    get(get_category)
                        .patch(update_category)
                        .delete(delete_category),
                )
        })
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<Reply<Category>, ApiError> {
    let name = non_blank("name", &payload.name)?;
    let category = state.categories.create(NewCategory { name }).await?;
    info!(category_id = category.id, name = %category.name, "category created");
    Ok(created("Category created successfully", category))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Reply<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(ok(
        format!("{} retrieved successfully", Category::PLURAL),
        categories,
    ))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<Category>, ApiError> {
    let category = state
        .categories
        .get_by_id(parse_id::<Category>(&id)?)
        .await?;
    Ok(ok("Category retrieved successfully", category))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Reply<Category>, ApiError> {
    let id = parse_id::<Category>(&id)?;
    let name = payload
        .name
        .as_deref()
        .map(|n| non_blank("name", n))
        .transpose()?;
    let category = state.categories.update(id, CategoryPatch { name }).await?;
    info!(category_id = category.id, "category updated");
    Ok(ok("Category updated successfully", category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<()>, ApiError> {
    let id = parse_id::<Category>(&id)?;
    state.categories.delete(id).await?;
    info!(category_id = id, "category deleted");
    Ok(done("Category deleted successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::{send, test_app, token_for};

    #[tokio::test]
    async fn crud_lifecycle() {
        let (app, _) = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Books"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Category created successfully");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/api/category/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Books");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/categories/{id}"),
            Some(json!({"name": "Novels"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Novels");

        let (status, body) = send(&app, Method::GET, "/api/categories", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Categories retrieved successfully");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/categories/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, &format!("/api/categories/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Category not found");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_and_keeps_count() {
        let (app, state) = test_app();
        let body = Some(json!({"name": "Toys"}));
        send(&app, Method::POST, "/api/category", body.clone(), None).await;
        let (status, resp) = send(&app, Method::POST, "/api/category", body, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(resp["message"], "Category name already exists");
        assert!(resp["data"].is_null());
        assert_eq!(state.categories.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_name_is_bad_request() {
        let (app, _) = test_app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "  "})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (app, _) = test_app();
        let (status, body) = send(&app, Method::DELETE, "/api/categories/12", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn deleting_category_detaches_its_products() {
        let (app, _) = test_app();
        let token = token_for(&app).await;

        let (_, category) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Lighting"})),
            None,
        )
        .await;
        let category_id = category["data"]["id"].as_i64().unwrap();

        let (status, product) = send(
            &app,
            Method::POST,
            "/api/product",
            Some(json!({"name": "Lamp", "price": 5, "category_id": category_id})),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let product_id = product["data"]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/categories/{category_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(&app, Method::GET, &format!("/api/product/{product_id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["category_id"].is_null());
        assert_eq!(body["data"]["name"], "Lamp");
    }
}
