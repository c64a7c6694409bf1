use super::payload::{Payload, TextField};
use regex_lite::Regex;
use resto_errors::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const NAME_MAX_LEN: usize = 255;
const EMAIL_MAX_LEN: usize = 254;
const URL_MAX_LEN: usize = 2048;
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: uuid::Uuid,
    #[serde(skip)]
    pub google_id: Option<String>,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl User {
    pub fn new(google_id: String, email: String, name: String, avatar_url: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            google_id: Some(google_id),
            email,
            name,
            avatar_url,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<Option<String>>,
}

impl UserInput {
    pub fn decode(body: &[u8], partial: bool) -> Result<Self, AppError> {
        let mut payload = Payload::parse(body, partial)?;
        let email = payload.text(TextField::new("email").required().max_len(EMAIL_MAX_LEN));
        let name = payload.text(TextField::new("name").required().max_len(NAME_MAX_LEN));
        let avatar_url = payload.nullable_text(TextField::new("avatar_url").max_len(URL_MAX_LEN));
        payload.finish()?;

        let mut errors = FieldErrors::new();
        let email = email.map(|email| email.to_lowercase());
        if let Some(email) = &email {
            if !EMAIL.is_match(email) {
                errors.add("email", "Enter a valid email address.");
            }
        }
        if let Some(Some(url)) = &avatar_url {
            if !is_web_url(url) {
                errors.add("avatar_url", "Enter a valid URL.");
            }
        }
        Ok(errors.into_result(Self {
            email,
            name,
            avatar_url,
        })?)
    }
}

fn is_web_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            ALLOWED_SCHEMES.contains(&parsed.scheme()) && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}
