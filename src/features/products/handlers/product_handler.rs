use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::products::dtos::{
    AdminProductListQuery, ProductFormDto, ProductListQuery, ProductResponseDto,
    SetCompatibilitiesDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, Meta};

/// Public catalog listing
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "List of catalog items", body = ApiResponse<Vec<ProductResponseDto>>),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let products = service.list(&query).await?;
    let meta = Meta {
        total: products.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(products), None, Some(meta))))
}

/// Get a catalog item
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductResponseDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Compatible items for a product
///
/// Returns compatible machines for an accessory, compatible accessories for
/// a machine.
#[utoipa::path(
    get,
    path = "/api/products/{id}/compatible",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Compatible items", body = ApiResponse<Vec<ProductResponseDto>>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn list_compatible(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let items = service.list_compatible(id).await?;
    Ok(Json(ApiResponse::success(Some(items), None, None)))
}

/// Admin product listing with free-text filter
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(AdminProductListQuery),
    responses(
        (status = 200, description = "List of catalog items", body = ApiResponse<Vec<ProductResponseDto>>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_products_admin(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<ProductService>>,
    Query(query): Query<AdminProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let products = service.list_admin(query.search.as_deref()).await?;
    let meta = Meta {
        total: products.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(products), None, Some(meta))))
}

/// Create a catalog item
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductFormDto,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_product(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<ProductService>>,
    AppJson(dto): AppJson<ProductFormDto>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Produit créé".to_string()),
        None,
    )))
}

/// Update a catalog item (full replace)
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductFormDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_product(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ProductFormDto>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Produit mis à jour".to_string()),
        None,
    )))
}

/// Delete a catalog item
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_product(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Produit supprimé".to_string()),
        None,
    )))
}

/// Replace the compatibility link set of a product
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}/compatibilities",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetCompatibilitiesDto,
    responses(
        (status = 200, description = "Links replaced"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn set_compatibilities(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetCompatibilitiesDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.set_compatibilities(id, dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Compatibilités mises à jour".to_string()),
        None,
    )))
}
