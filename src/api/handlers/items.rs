//! Item CRUD and listing handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ITEM_TAG;
use crate::api::dto::{CreateItemRequest, ItemListQuery, ItemResponse, UpdateItemRequest};
use crate::common::PagedResponse;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates item routes.
///
/// Routes:
/// - GET /        - List items (paged, filtered, sorted)
/// - POST /       - Create an item
/// - GET /{id}    - Get item by ID
/// - PUT /{id}    - Update item by ID
/// - DELETE /{id} - Delete item by ID
pub fn item_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_items, create_item))
        .routes(routes!(get_item, update_item, delete_item))
}

/// GET /api/items - List items by page
#[utoipa::path(
    get,
    path = "/",
    tag = ITEM_TAG,
    params(ItemListQuery),
    responses(
        (status = 200, description = "One page of items", body = PagedResponse<ItemResponse>),
        (status = 400, description = "Invalid paging parameters", body = crate::api::dto::ErrorResponse)
    )
)]
async fn list_items(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ItemListQuery>,
) -> AppResult<Json<PagedResponse<ItemResponse>>> {
    let params = query.pagination()?;
    let (items, total) = state
        .services
        .items
        .get_multi(Some(&params), Some(query.filter()), Some(query.sort()))
        .await?;

    Ok(Json(
        PagedResponse::new(items, total, &params).map(ItemResponse::from),
    ))
}

/// POST /api/items - Create an item
#[utoipa::path(
    post,
    path = "/",
    tag = ITEM_TAG,
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid item", body = crate::api::dto::ErrorResponse)
    )
)]
async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemResponse>)> {
    let item = state.services.items.create(req.into_new_item()).await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// GET /api/items/{id} - Get item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ITEM_TAG,
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemResponse),
        (status = 404, description = "Item not found", body = crate::api::dto::ErrorResponse)
    )
)]
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ItemResponse>> {
    let item = state
        .services
        .items
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Item", id))?;
    Ok(Json(ItemResponse::from(item)))
}

/// PUT /api/items/{id} - Update the supplied fields of an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ITEM_TAG,
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Invalid changes", body = crate::api::dto::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::api::dto::ErrorResponse)
    )
)]
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateItemRequest>,
) -> AppResult<Json<ItemResponse>> {
    let item = state
        .services
        .items
        .update(id, req.into_update_item())
        .await?
        .ok_or_else(|| AppError::not_found("Item", id))?;
    Ok(Json(ItemResponse::from(item)))
}

/// DELETE /api/items/{id} - Delete item by ID
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ITEM_TAG,
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::api::dto::ErrorResponse)
    )
)]
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.services.items.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Item", id))
    }
}
