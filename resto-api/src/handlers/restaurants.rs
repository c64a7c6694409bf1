use crate::extract::{AuthUser, ResourceId};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use resto_app::domain::{Restaurant, RestaurantInput, RestaurantQuery};
use resto_app::AppContext;
use resto_errors::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    search: Option<String>,
    ordering: Option<String>,
}

pub async fn list(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let query = RestaurantQuery::new(params.search.as_deref(), params.ordering.as_deref());
    Ok(Json(ctx.restaurants.list(&query).await?))
}

pub async fn create(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<Restaurant>), AppError> {
    let input = RestaurantInput::decode(&body, false)?;
    let created = ctx.restaurants.create(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn retrieve(
    State(ctx): State<AppContext>,
    ResourceId(id): ResourceId<i32>,
) -> Result<Json<Restaurant>, AppError> {
    ctx.restaurants
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

pub async fn replace(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
    body: Bytes,
) -> Result<Json<Restaurant>, AppError> {
    update(ctx, id, &body, false).await
}

pub async fn patch(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
    body: Bytes,
) -> Result<Json<Restaurant>, AppError> {
    update(ctx, id, &body, true).await
}

async fn update(
    ctx: AppContext,
    id: i32,
    body: &[u8],
    partial: bool,
) -> Result<Json<Restaurant>, AppError> {
    let model = ctx.restaurants.find_active(id).await?.ok_or(AppError::NotFound)?;
    let input = RestaurantInput::decode(body, partial)?;
    Ok(Json(ctx.restaurants.update(model, &input).await?))
}

/// Soft delete.
pub async fn destroy(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
) -> Result<StatusCode, AppError> {
    let model = ctx.restaurants.find_active(id).await?.ok_or(AppError::NotFound)?;
    ctx.restaurants.deactivate(model).await?;
    Ok(StatusCode::NO_CONTENT)
}
