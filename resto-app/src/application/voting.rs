use crate::domain::{Ballot, VoteDirection, VoteTally};
use crate::infrastructure::db::{RestaurantRepository, VoteRepository};
use resto_errors::AppError;
use uuid::Uuid;

/// Reads and casts votes on active restaurants.
///
/// An up-vote is recorded at most once per user: if the user already has a
/// vote of either direction on the restaurant, nothing is written. A
/// down-vote is always recorded. The tally counts every record, so it is a
/// measure of engagement and never a net score.
pub struct Voting {
    restaurants: RestaurantRepository,
    votes: VoteRepository,
}

impl Voting {
    pub fn new(restaurants: RestaurantRepository, votes: VoteRepository) -> Self {
        Self { restaurants, votes }
    }

    #[tracing::instrument(skip(self))]
    pub async fn tally(&self, restaurant_id: i32) -> Result<VoteTally, AppError> {
        self.restaurants
            .find_active(restaurant_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let votes = self.votes.count(restaurant_id).await?;
        Ok(VoteTally { votes })
    }

    /// The restaurant lookup runs before the body is decoded, so an unknown
    /// restaurant answers 404 even for a malformed ballot.
    #[tracing::instrument(skip(self, body))]
    pub async fn submit(
        &self,
        restaurant_id: i32,
        voter: Uuid,
        body: &[u8],
    ) -> Result<VoteTally, AppError> {
        self.restaurants
            .find_active(restaurant_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let ballot = Ballot::decode(body)?;

        match ballot.direction() {
            VoteDirection::Up => {
                // Check-then-insert: two concurrent first up-votes may both land.
                if self.votes.exists(voter, restaurant_id).await? {
                    tracing::debug!("Up-vote ignored, user already voted");
                } else {
                    self.votes.record(voter, restaurant_id, VoteDirection::Up).await?;
                }
            }
            VoteDirection::Down => {
                self.votes.record(voter, restaurant_id, VoteDirection::Down).await?;
            }
        }

        let votes = self.votes.count(restaurant_id).await?;
        tracing::info!(votes, direction = ?ballot.direction(), "Vote submitted");
        Ok(VoteTally { votes })
    }
}
