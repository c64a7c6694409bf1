use super::payload::{Payload, TextField};
use chrono::{DateTime, Utc};
use resto_errors::AppError;
use serde::{Deserialize, Serialize};

pub const TEXT_MAX_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub restaurant: i32,
    pub user: uuid::Uuid,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentInput {
    pub restaurant: Option<i32>,
    pub text: Option<String>,
}

impl CommentInput {
    pub fn decode(body: &[u8], partial: bool) -> Result<Self, AppError> {
        let mut payload = Payload::parse(body, partial)?;
        let input = Self {
            restaurant: payload.primary_key("restaurant", true),
            text: payload.text(TextField::new("text").required().max_len(TEXT_MAX_LEN)),
        };
        payload.finish()?;
        Ok(input)
    }
}
