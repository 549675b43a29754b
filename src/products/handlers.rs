use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, patch, post},
    Extension, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateProductRequest, UpdateProductRequest},
    repo_types::{NewProduct, Product, ProductPatch},
};
use crate::{
    auth::middleware::{require_auth, AuthUser},
    error::ApiError,
    extract::{non_blank, parse_id, ApiJson},
    repository::{Entity, RepoError},
    response::{created, done, ok, Reply},
    state::AppState,
};

/// Reads are public; create, update and delete sit behind the bearer-token guard.
/// Served under both `/product` and `/products`.
pub fn product_routes(state: AppState) -> Router<AppState> {
    let bases = ["/product", "/products"];

    let public = bases.into_iter().fold(Router::new(), |router, base| {
        router
            .route(base, get(list_products))
            .route(&format!("{base}/:id"), get(get_product))
    });

    let guarded = bases
        .into_iter()
        .fold(Router::new(), |router, base| {
            router
                .route(base, post(create_product))
                .route(
                    &format!("{base}/:id"),
                    patch(update_product).delete(delete_product),
                )
        })
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(guarded)
}

/// Rejects a `category_id` that names no stored category.
async fn ensure_category(state: &AppState, category_id: Option<i64>) -> Result<(), ApiError> {
    let Some(id) = category_id else {
        return Ok(());
    };
    match state.categories.get_by_id(id).await {
        Ok(_) => Ok(()),
        Err(RepoError::NotFound(_)) => {
            warn!(category_id = id, "unknown category referenced");
            Err(ApiError::bad_request("Category does not exist"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Largest magnitude the `NUMERIC(12,2)` price columns hold, exclusive.
const AMOUNT_LIMIT: i64 = 10_000_000_000;
const AMOUNT_SCALE: u32 = 2;

fn checked_amount(field: &'static str, value: Decimal) -> Result<Decimal, ApiError> {
    if value.normalize().scale() > AMOUNT_SCALE || value.abs() >= Decimal::from(AMOUNT_LIMIT) {
        warn!(field, %value, "amount out of range");
        return Err(ApiError::bad_request(format!(
            "{field} must be below {AMOUNT_LIMIT} with at most {AMOUNT_SCALE} decimals"
        )));
    }
    Ok(value)
}

/// The category can disappear between [`ensure_category`] and the write.
fn missing_category(err: RepoError) -> ApiError {
    match err {
        RepoError::MissingReference(_) => ApiError::bad_request("Category does not exist"),
        other => other.into(),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> Result<Reply<Product>, ApiError> {
    let name = non_blank("name", &payload.name)?;
    let price = checked_amount("price", payload.price)?;
    let discount = checked_amount("discount", payload.discount)?;
    ensure_category(&state, payload.category_id).await?;

    let product = state
        .products
        .create(NewProduct {
            name,
            description: payload.description,
            qty: payload.qty,
            price,
            discount,
            category_id: payload.category_id,
        })
        .await
        .map_err(missing_category)?;

    info!(product_id = product.id, by = user_id, "product created");
    Ok(created("Product created successfully", product))
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Reply<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    Ok(ok(
        format!("{} retrieved successfully", Product::PLURAL),
        products,
    ))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<Product>, ApiError> {
    let product = state.products.get_by_id(parse_id::<Product>(&id)?).await?;
    Ok(ok("Product retrieved successfully", product))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateProductRequest>,
) -> Result<Reply<Product>, ApiError> {
    let id = parse_id::<Product>(&id)?;
    state.products.get_by_id(id).await?;

    let name = payload
        .name
        .as_deref()
        .map(|n| non_blank("name", n))
        .transpose()?;
    let price = payload.price.map(|p| checked_amount("price", p)).transpose()?;
    let discount = payload
        .discount
        .map(|d| checked_amount("discount", d))
        .transpose()?;
    ensure_category(&state, payload.category_id).await?;

    let product = state
        .products
        .update(
            id,
            ProductPatch {
                name,
                description: payload.description,
                qty: payload.qty,
                price,
                discount,
                category_id: payload.category_id,
            },
        )
        .await
        .map_err(missing_category)?;

    info!(product_id = product.id, by = user_id, "product updated");
    Ok(ok("Product updated successfully", product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Reply<()>, ApiError> {
    let id = parse_id::<Product>(&id)?;
    state.products.delete(id).await?;
    info!(product_id = id, by = user_id, "product deleted");
    Ok(done("Product deleted successfully"))
}
