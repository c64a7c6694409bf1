use crate::domain::User;
use crate::infrastructure::auth::GoogleOAuth;
use crate::infrastructure::db::UserRepository;
use oauth2::PkceCodeVerifier;
use resto_errors::AppError;

/// Values the caller keeps (in the session) between redirecting the browser
/// to Google and handling the callback.
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// Google sign-in: builds the consent redirect and turns a callback into a
/// stored user.
pub struct GoogleSignIn {
    oauth: GoogleOAuth,
    users: UserRepository,
}

impl GoogleSignIn {
    pub fn new(oauth: GoogleOAuth, users: UserRepository) -> Self {
        Self { oauth, users }
    }

    pub fn start(&self) -> AuthorizationRequest {
        let (url, csrf, verifier) = self.oauth.get_auth_url();
        AuthorizationRequest {
            url,
            csrf_state: csrf.secret().clone(),
            pkce_verifier: verifier.secret().clone(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn complete(
        &self,
        code: &str,
        returned_state: &str,
        expected_state: &str,
        pkce_verifier: String,
    ) -> Result<User, AppError> {
        if returned_state != expected_state {
            tracing::warn!("OAuth state mismatch");
            return Err(AppError::AuthFailed("Invalid OAuth state.".to_string()));
        }

        let profile = self
            .oauth
            .exchange_code(code, PkceCodeVerifier::new(pkce_verifier))
            .await?;
        let model = self.users.upsert_google(&profile.into_user()).await?;
        tracing::info!(user_id = %model.id, "User signed in with Google");
        Ok(model.into())
    }
}
