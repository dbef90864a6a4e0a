//! Product catalog endpoints.
//!
//! Every route requires the tenant header; reads by id verify ownership
//! through the tenant-scoped SQL path before touching the DTO cache.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rusqlite::types::Value;
use serde::Deserialize;
use uuid::Uuid;

use tienda_core::catalog::{CreateProductRequest, Product, ProductDetails, UpdateProductRequest};
use tienda_core::entity::Entity;
use tienda_core::storage::{PageRequest, RepositoryError};

use crate::cache::AppCache;
use crate::context::RequestContext;
use crate::state::AppState;
use crate::storage::{CachedRepository, SqliteStore, Table};

use super::AppError;

/// Optional paging parameters. When both are present the tenant's catalog
/// is paged; otherwise the whole of it is returned.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page_number: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub min_rate: f64,
}

/// Resolves a product by id within the caller's tenant, or `NotFound`.
async fn find_owned(
    repo: &CachedRepository<SqliteStore, AppCache>,
    ctx: &RequestContext,
    id: Uuid,
) -> Result<Product, AppError> {
    let sql = format!(
        "SELECT {} FROM products WHERE tenant_id = @tenantId AND id = @id",
        Product::COLUMNS.join(", ")
    );
    repo.query_first_or_default::<Product>(
        &sql,
        vec![("@id", Value::Text(id.to_string()))],
        &ctx.tenant.tenant_id,
    )
    .await
    .map_err(|e| match e {
        // Re-raise with the id the caller asked for, not the query shape.
        RepositoryError::NotFound { .. } => {
            AppError(RepositoryError::not_found(Product::TYPE_NAME, id).into())
        }
        other => AppError(other.into()),
    })
}

/// List the tenant's products (GET /api/products).
#[axum::debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductDetails>>, AppError> {
    let repo = state.repository();
    let tenant_id = ctx.tenant.tenant_id.clone();

    let products: Vec<Product> = match (params.page_number, params.page_size) {
        (Some(page_number), Some(page_size)) => {
            // Page within the tenant's rows, so the window never spans
            // other tenants' data.
            let page = PageRequest::new(page_number, page_size);
            let sql = format!(
                "SELECT {} FROM products WHERE tenant_id = @tenantId \
                 ORDER BY rowid LIMIT @limit OFFSET @offset",
                Product::COLUMNS.join(", ")
            );
            repo.query::<Product>(
                &sql,
                vec![
                    ("@limit", Value::Integer(page.limit() as i64)),
                    ("@offset", Value::Integer(page.offset() as i64)),
                ],
                &tenant_id,
            )
            .await?
        }
        _ => {
            repo.get_list(|p: &Product| p.tenant_id == tenant_id, true)
                .await?
        }
    };

    Ok(Json(
        products.into_iter().map(ProductDetails::from).collect(),
    ))
}

/// Search the tenant's products by minimum rate (GET /api/products/search).
#[axum::debug_handler]
pub async fn search_products(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductDetails>>, AppError> {
    let sql = format!(
        "SELECT {} FROM products WHERE tenant_id = @tenantId AND rate >= @minRate ORDER BY rowid",
        Product::COLUMNS.join(", ")
    );
    let products = state
        .repository()
        .query::<Product>(
            &sql,
            vec![("@minRate", Value::Real(params.min_rate))],
            &ctx.tenant.tenant_id,
        )
        .await?;

    Ok(Json(
        products.into_iter().map(ProductDetails::from).collect(),
    ))
}

/// Get a product's details (GET /api/products/{id}).
///
/// Ownership is checked against the database first; the DTO itself is
/// then served read-through from the cache.
#[axum::debug_handler]
pub async fn get_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetails>, AppError> {
    let repo = state.repository();
    find_owned(&repo, &ctx, id).await?;

    let dto = repo.get_cached_dto_by_id::<Product, ProductDetails>(id).await?;
    Ok(Json(dto))
}

/// Create a product (POST /api/products).
#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDetails>), AppError> {
    let product = Product::new(
        ctx.tenant.tenant_id.clone(),
        request.name,
        request.description,
        request.rate,
    );

    let repo = state.repository();
    repo.create(&product)?;
    repo.save_changes().await?;

    tracing::info!(product_id = %product.id, tenant = %ctx.tenant.tenant_id, "product created");
    Ok((StatusCode::CREATED, Json(ProductDetails::from(product))))
}

/// Update a product (PUT /api/products/{id}).
#[axum::debug_handler]
pub async fn update_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductDetails>, AppError> {
    let repo = state.repository();
    let mut product = find_owned(&repo, &ctx, id).await?;

    request.apply_to(&mut product);
    repo.update(&product).await?;
    repo.save_changes().await?;

    Ok(Json(ProductDetails::from(product)))
}

/// Delete a product (DELETE /api/products/{id}).
#[axum::debug_handler]
pub async fn delete_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = state.repository();
    let product = find_owned(&repo, &ctx, id).await?;

    repo.remove(&product).await?;
    repo.save_changes().await?;

    tracing::info!(product_id = %id, tenant = %ctx.tenant.tenant_id, "product deleted");
    Ok(StatusCode::OK)
}
