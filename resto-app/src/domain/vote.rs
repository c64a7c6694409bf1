use super::payload::{Payload, REQUIRED};
use resto_errors::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Decoded body of a vote submission: `{"vote": true}` is an up-vote,
/// `{"vote": false}` a down-vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub vote: bool,
}

impl Ballot {
    pub fn decode(body: &[u8]) -> Result<Self, AppError> {
        let mut payload = Payload::parse(body, false)?;
        let vote = payload.boolean("vote", true);
        payload.finish()?;
        let vote = vote.ok_or_else(|| FieldErrors::single("vote", REQUIRED))?;
        Ok(Self { vote })
    }

    pub fn direction(&self) -> VoteDirection {
        if self.vote {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }
}

/// Response body of both vote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(
            Ballot::decode(br#"{"vote": true}"#).unwrap().direction(),
            VoteDirection::Up
        );
        assert_eq!(
            Ballot::decode(br#"{"vote": false, "extra": 1}"#).unwrap().direction(),
            VoteDirection::Down
        );
    }

    #[test]
    fn test_decode_rejects_non_boolean() {
        match Ballot::decode(br#"{"vote": "yes"}"#) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("vote").unwrap(), ["Must be a valid boolean."])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tally_shape() {
        let json = serde_json::to_value(VoteTally { votes: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"votes": 3}));
    }
}
