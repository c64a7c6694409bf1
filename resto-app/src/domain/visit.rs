use super::payload::Payload;
use chrono::{DateTime, Utc};
use resto_errors::AppError;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i32,
    pub restaurant: i32,
    pub user: uuid::Uuid,
    pub rating: Option<i16>,
    pub visited_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitInput {
    pub restaurant: Option<i32>,
    /// `Some(None)` clears the rating.
    pub rating: Option<Option<i16>>,
    pub visited_at: Option<DateTime<Utc>>,
}

impl VisitInput {
    pub fn decode(body: &[u8], partial: bool) -> Result<Self, AppError> {
        let mut payload = Payload::parse(body, partial)?;
        let input = Self {
            restaurant: payload.primary_key("restaurant", true),
            rating: payload
                .nullable_integer("rating", MIN_RATING, MAX_RATING)
                .map(|rating| rating.map(|r| r as i16)),
            visited_at: payload.datetime("visited_at", false),
        };
        payload.finish()?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full() {
        let input = VisitInput::decode(
            br#"{"restaurant": 3, "rating": 4, "visited_at": "2024-02-01T19:00:00Z"}"#,
            false,
        )
        .unwrap();
        assert_eq!(input.restaurant, Some(3));
        assert_eq!(input.rating, Some(Some(4)));
        assert!(input.visited_at.is_some());
    }

    #[test]
    fn test_rating_out_of_range() {
        match VisitInput::decode(br#"{"restaurant": 3, "rating": 0}"#, false) {
            Err(AppError::Validation(errors)) => assert_eq!(
                errors.get("rating").unwrap(),
                ["Ensure this value is greater than or equal to 1."]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clear_rating() {
        let input = VisitInput::decode(br#"{"rating": null}"#, true).unwrap();
        assert_eq!(input.rating, Some(None));
        assert_eq!(input.restaurant, None);
    }
}
