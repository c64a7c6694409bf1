use crate::extract::{AuthUser, ResourceId};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use resto_app::domain::VoteTally;
use resto_app::AppContext;
use resto_errors::AppError;

pub async fn tally(
    State(ctx): State<AppContext>,
    ResourceId(id): ResourceId<i32>,
) -> Result<Json<VoteTally>, AppError> {
    Ok(Json(ctx.voting.tally(id).await?))
}

/// `AuthUser` runs first, so an anonymous request is rejected before the
/// restaurant or the ledger is read.
pub async fn submit(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ResourceId(id): ResourceId<i32>,
    body: Bytes,
) -> Result<Json<VoteTally>, AppError> {
    Ok(Json(ctx.voting.submit(id, user.id, &body).await?))
}
