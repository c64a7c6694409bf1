use crate::extract::{session_error, USER_ID_KEY};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use resto_app::application::GoogleSignIn;
use resto_app::AppContext;
use resto_errors::AppError;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

const CSRF_STATE_KEY: &str = "oauth_csrf_state";
const PKCE_VERIFIER_KEY: &str = "oauth_pkce_verifier";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn google(ctx: &AppContext) -> Result<&Arc<GoogleSignIn>, AppError> {
    ctx.google.as_ref().ok_or(AppError::NotFound)
}

pub async fn login(State(ctx): State<AppContext>, session: Session) -> Result<Redirect, AppError> {
    let request = google(&ctx)?.start();
    session
        .insert(CSRF_STATE_KEY, &request.csrf_state)
        .await
        .map_err(session_error)?;
    session
        .insert(PKCE_VERIFIER_KEY, &request.pkce_verifier)
        .await
        .map_err(session_error)?;
    Ok(Redirect::to(&request.url))
}

pub async fn callback(
    State(ctx): State<AppContext>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let google = google(&ctx)?;
    let expected: Option<String> = session.remove(CSRF_STATE_KEY).await.map_err(session_error)?;
    let verifier: Option<String> = session.remove(PKCE_VERIFIER_KEY).await.map_err(session_error)?;

    if let Some(error) = params.error {
        return Err(AppError::AuthFailed(format!("Google returned {error}")));
    }
    let (Some(code), Some(state), Some(expected), Some(verifier)) =
        (params.code, params.state, expected, verifier)
    else {
        return Err(AppError::AuthFailed("Incomplete OAuth callback.".to_string()));
    };

    let user = google.complete(&code, &state, &expected, verifier).await?;

    // New id on privilege change.
    session.cycle_id().await.map_err(session_error)?;
    session.insert(USER_ID_KEY, user.id).await.map_err(session_error)?;
    Ok(Redirect::to("/"))
}

pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    session.flush().await.map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}
