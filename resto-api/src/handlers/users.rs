use crate::extract::{AuthUser, ResourceId};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use resto_app::domain::{User, UserInput};
use resto_app::AppContext;
use resto_errors::{AppError, FieldErrors};
use uuid::Uuid;

const EMAIL_TAKEN: &str = "user with this email address already exists.";

pub async fn list(State(ctx): State<AppContext>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(ctx.users.list().await?))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

pub async fn create(
    State(ctx): State<AppContext>,
    _user: AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<User>), AppError> {
    let input = UserInput::decode(&body, false)?;
    ensure_email_free(&ctx, &input, None).await?;
    let created = ctx.users.create(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn retrieve(
    State(ctx): State<AppContext>,
    ResourceId(id): ResourceId<Uuid>,
) -> Result<Json<User>, AppError> {
    let model = ctx.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(model.into()))
}

pub async fn replace(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ResourceId(id): ResourceId<Uuid>,
    body: Bytes,
) -> Result<Json<User>, AppError> {
    update(ctx, user, id, &body, false).await
}

pub async fn patch(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ResourceId(id): ResourceId<Uuid>,
    body: Bytes,
) -> Result<Json<User>, AppError> {
    update(ctx, user, id, &body, true).await
}

async fn update(
    ctx: AppContext,
    user: User,
    id: Uuid,
    body: &[u8],
    partial: bool,
) -> Result<Json<User>, AppError> {
    let model = ctx.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    if model.id != user.id {
        return Err(AppError::Forbidden);
    }
    let input = UserInput::decode(body, partial)?;
    ensure_email_free(&ctx, &input, Some(model.id)).await?;
    Ok(Json(ctx.users.update(model, &input).await?))
}

pub async fn destroy(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ResourceId(id): ResourceId<Uuid>,
) -> Result<StatusCode, AppError> {
    let model = ctx.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    if model.id != user.id {
        return Err(AppError::Forbidden);
    }
    ctx.users.delete(model).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `owner` is the account being edited, which may keep its own address.
async fn ensure_email_free(
    ctx: &AppContext,
    input: &UserInput,
    owner: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(email) = &input.email else {
        return Ok(());
    };
    match ctx.users.find_by_email(email).await? {
        Some(existing) if Some(existing.id) != owner => {
            Err(FieldErrors::single("email", EMAIL_TAKEN).into())
        }
        _ => Ok(()),
    }
}
