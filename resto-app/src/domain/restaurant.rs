use super::payload::{Payload, TextField};
use resto_errors::AppError;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub rating: Option<f64>,
    pub votes: u64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Writable restaurant fields. `None` means "not supplied": create fills in
/// defaults, updates leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl RestaurantInput {
    pub fn decode(body: &[u8], partial: bool) -> Result<Self, AppError> {
        let mut payload = Payload::parse(body, partial)?;
        let input = Self {
            name: payload.text(TextField::new("name").required().max_len(NAME_MAX_LEN)),
            description: payload.text(TextField::new("description").allow_blank()),
            active: payload.boolean("active", false),
        };
        payload.finish()?;
        Ok(input)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.active.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Name,
    Votes,
    Rating,
}

impl OrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "votes" => Some(Self::Votes),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Search and ordering options for the restaurant listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantQuery {
    /// Every term must match the name or the description.
    pub search: Vec<String>,
    pub ordering: Vec<(OrderField, SortOrder)>,
}

impl RestaurantQuery {
    pub fn new(search: Option<&str>, ordering: Option<&str>) -> Self {
        Self {
            search: search.map(search_terms).unwrap_or_default(),
            ordering: ordering.map(ordering_fields).unwrap_or_default(),
        }
    }
}

fn search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unknown field names are dropped.
fn ordering_fields(raw: &str) -> Vec<(OrderField, SortOrder)> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (name, order) = match term.strip_prefix('-') {
                Some(name) => (name, SortOrder::Desc),
                None => (term, SortOrder::Asc),
            };
            OrderField::parse(name).map(|field| (field, order))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms_split_on_whitespace_and_commas() {
        let query = RestaurantQuery::new(Some(" pizza, napoli  oven"), None);
        assert_eq!(query.search, vec!["pizza", "napoli", "oven"]);
        assert!(RestaurantQuery::new(Some("  , "), None).search.is_empty());
    }

    #[test]
    fn test_ordering_allow_list() {
        let query = RestaurantQuery::new(None, Some("-votes,name,description,-bogus,rating"));
        assert_eq!(
            query.ordering,
            vec![
                (OrderField::Votes, SortOrder::Desc),
                (OrderField::Name, SortOrder::Asc),
                (OrderField::Rating, SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_decode_create_requires_name() {
        let err = RestaurantInput::decode(br#"{"description": "x"}"#, false).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.get("name").unwrap(), ["This field is required."])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_partial() {
        let input = RestaurantInput::decode(br#"{"active": false}"#, true).unwrap();
        assert_eq!(
            input,
            RestaurantInput {
                active: Some(false),
                ..Default::default()
            }
        );
        assert!(RestaurantInput::decode(b"{}", true).unwrap().is_empty());
    }
}
