use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use resto_errors::AppError;
use serde::Deserialize;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Profile returned by the userinfo endpoint. `sub` is the stable Google
/// account id.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleUserInfo {
    pub fn into_user(self) -> crate::domain::User {
        let email = self.email.to_lowercase();
        let name = self.name.unwrap_or_else(|| email.clone());
        crate::domain::User::new(self.sub, email, name, self.picture)
    }
}

type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

#[derive(Clone)]
pub struct GoogleOAuth {
    client: ConfiguredClient,
    redirect_uri: RedirectUrl,
    http_client: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Result<Self, AppError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string()).map_err(config_error)?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).map_err(config_error)?;
        let redirect = RedirectUrl::new(redirect_uri.to_string()).map_err(config_error)?;

        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url);

        let http_client = reqwest::Client::new();

        Ok(Self {
            client,
            redirect_uri: redirect,
            http_client,
        })
    }

    /// Authorization URL plus the CSRF state and PKCE verifier that must be
    /// kept until the callback.
    pub fn get_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<GoogleUserInfo, AppError> {
        // Token endpoint must not follow redirects.
        let http_client = oauth2::reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .map_err(|e| AppError::AuthFailed(format!("Token exchange failed: {e:?}")))?;

        let access_token = token_result.access_token().secret();

        let user_info = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::AuthFailed(format!("Failed to fetch user info: {e}")))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::AuthFailed(format!("Failed to parse user info: {e}")))?;

        Ok(user_info)
    }
}

fn config_error(err: oauth2::url::ParseError) -> AppError {
    AppError::Internal(format!("Invalid OAuth endpoint: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_carries_pkce_and_scopes() {
        let oauth = GoogleOAuth::new("client-id", "secret", "http://localhost:3000/auth/google/callback")
            .unwrap();
        let (url, csrf, _verifier) = oauth.get_auth_url();
        let parsed = url::Url::parse(&url).unwrap();
        let query: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("accounts.google.com"));
        assert_eq!(query["client_id"], "client-id");
        assert_eq!(query["state"], *csrf.secret());
        assert_eq!(query["code_challenge_method"], "S256");
        assert_eq!(query["scope"], "openid email profile");
    }

    #[test]
    fn test_invalid_redirect_is_rejected() {
        assert!(matches!(
            GoogleOAuth::new("id", "secret", "not a url"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_profile_without_name_falls_back_to_email() {
        let info = GoogleUserInfo {
            sub: "123".into(),
            email: "Ada@Example.com".into(),
            name: None,
            picture: None,
        };
        let user = info.into_user();
        assert_eq!(user.google_id.as_deref(), Some("123"));
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "ada@example.com");
    }
}
