use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use resto_app::domain::User;
use resto_app::AppContext;
use resto_errors::AppError;
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use uuid::Uuid;

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// The signed-in user. Rejects with 401 when the session carries no user or
/// the user no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let session = session(parts, ctx).await?;
        let user_id: Uuid = session
            .get(USER_ID_KEY)
            .await
            .map_err(session_error)?
            .ok_or(AppError::Unauthorized)?;

        match ctx.users.find_by_id(user_id).await? {
            Some(model) => Ok(Self(model.into())),
            None => {
                tracing::debug!(%user_id, "Session refers to a deleted user");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Path id of a resource. An id that does not parse is reported as 404,
/// the same as an id that names nothing.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId<T>(pub T);

impl<T, S> FromRequestParts<S> for ResourceId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(Self(id))
    }
}

pub(crate) async fn session<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Session, AppError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(format!("Session unavailable: {msg}")))
}

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session store failed: {err}"))
}
