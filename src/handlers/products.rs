//! Catalog endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::domain::product::{CreateProductRequest, Product, ProductPatch};
use crate::error::ApiError;
use crate::response::{clamp_limit, clamp_page, offset, ok_msg, ApiResponse, ApiResult, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub action: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct IdParam {
    pub id: Option<i64>,
}

struct Filters {
    search: Option<String>,
    category: Option<String>,
}

impl Filters {
    fn from_params(params: &ListParams) -> Self {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        // "all" is the storefront's wildcard category.
        let category = params
            .category
            .clone()
            .filter(|c| !c.is_empty() && c != "all");
        Self { search, category }
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(pattern) = &self.search {
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR category ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(")");
        }
        if let Some(category) = &self.category {
            builder.push(" AND category = ");
            builder.push_bind(category.clone());
        }
    }
}

pub async fn dispatch_get(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    if params.action.as_deref() == Some("categories") {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(&state.db)
                .await?;
        return Ok(Json(ApiResponse::success(categories)).into_response());
    }

    let list = list_products(&state, &params).await?;
    Ok(Json(ApiResponse::success(list)).into_response())
}

async fn list_products(state: &AppState, params: &ListParams) -> Result<ProductList, ApiError> {
    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit, 20, 100);
    let filters = Filters::from_params(params);

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
    filters.apply(&mut count_query);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut list_query = QueryBuilder::new("SELECT * FROM products WHERE 1=1");
    filters.apply(&mut list_query);
    list_query.push(" ORDER BY created_at DESC LIMIT ");
    list_query.push_bind(limit as i64);
    list_query.push(" OFFSET ");
    list_query.push_bind(offset(page, limit));
    let products = list_query
        .build_query_as::<Product>()
        .fetch_all(&state.db)
        .await?;

    Ok(ProductList {
        products,
        pagination: Pagination::new(page, limit, total),
    })
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(request) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let new = request.validate()?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, category, image, stock) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(&new.category)
    .bind(&new.image)
    .bind(new.stock)
    .fetch_one(&state.db)
    .await?;

    ok_msg(product, "Product added successfully")
}

pub async fn update(
    State(state): State<AppState>,
    param: Result<Query<IdParam>, QueryRejection>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Product> {
    let Query(param) = param.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let id = param
        .id
        .ok_or_else(|| ApiError::validation("Product ID is required"))?;
    let Json(patch) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    patch.validate()?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         price = COALESCE($4, price), \
         category = COALESCE($5, category), \
         image = COALESCE($6, image), \
         stock = COALESCE($7, stock) \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.price)
    .bind(&patch.category)
    .bind(&patch.image)
    .bind(patch.stock)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::ProductNotFound)?;

    ok_msg(product, "Product updated successfully")
}

pub async fn delete(
    State(state): State<AppState>,
    param: Result<Query<IdParam>, QueryRejection>,
) -> ApiResult<()> {
    let Query(param) = param.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let id = param
        .id
        .ok_or_else(|| ApiError::validation("Product ID is required"))?;

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::ProductNotFound);
    }

    ok_msg((), "Product deleted successfully")
}
