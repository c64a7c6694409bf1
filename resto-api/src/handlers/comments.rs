use super::check_restaurant;
use crate::extract::{AuthUser, ResourceId};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use resto_app::domain::{Comment, CommentInput};
use resto_app::AppContext;
use resto_errors::AppError;

pub async fn list(State(ctx): State<AppContext>) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(ctx.comments.list().await?))
}

pub async fn create(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let input = CommentInput::decode(&body, false)?;
    check_restaurant(&ctx, input.restaurant).await?;
    let created = ctx.comments.create(user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn retrieve(
    State(ctx): State<AppContext>,
    ResourceId(id): ResourceId<i32>,
) -> Result<Json<Comment>, AppError> {
    let model = ctx.comments.find_visible(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(model.into()))
}

pub async fn replace(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
    body: Bytes,
) -> Result<Json<Comment>, AppError> {
    update(ctx, id, &body, false).await
}

pub async fn patch(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
    body: Bytes,
) -> Result<Json<Comment>, AppError> {
    update(ctx, id, &body, true).await
}

async fn update(ctx: AppContext, id: i32, body: &[u8], partial: bool) -> Result<Json<Comment>, AppError> {
    let model = ctx.comments.find_visible(id).await?.ok_or(AppError::NotFound)?;
    let input = CommentInput::decode(body, partial)?;
    check_restaurant(&ctx, input.restaurant).await?;
    Ok(Json(ctx.comments.update(model, &input).await?))
}

pub async fn destroy(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    ResourceId(id): ResourceId<i32>,
) -> Result<StatusCode, AppError> {
    let model = ctx.comments.find_visible(id).await?.ok_or(AppError::NotFound)?;
    ctx.comments.delete(model).await?;
    Ok(StatusCode::NO_CONTENT)
}
