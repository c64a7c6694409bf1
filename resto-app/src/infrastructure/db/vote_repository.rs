use super::entities::{vote, Vote};
use crate::domain::VoteDirection;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

/// The vote ledger: per-restaurant vote records with existence and count
/// queries.
#[derive(Clone)]
pub struct VoteRepository {
    db: DatabaseConnection,
}

impl VoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether the user has any vote, in either direction, on the restaurant.
    pub async fn exists(&self, user_id: Uuid, restaurant_id: i32) -> Result<bool, DbErr> {
        let vote = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::RestaurantId.eq(restaurant_id))
            .one(&self.db)
            .await?;
        Ok(vote.is_some())
    }

    /// Append a vote record. No uniqueness is enforced here.
    pub async fn record(
        &self,
        user_id: Uuid,
        restaurant_id: i32,
        direction: VoteDirection,
    ) -> Result<vote::Model, DbErr> {
        let active = vote::ActiveModel {
            restaurant_id: Set(restaurant_id),
            user_id: Set(user_id),
            direction: Set(direction.into()),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        };
        active.insert(&self.db).await
    }

    /// Number of vote records, up and down alike.
    pub async fn count(&self, restaurant_id: i32) -> Result<u64, DbErr> {
        Vote::find()
            .filter(vote::Column::RestaurantId.eq(restaurant_id))
            .count(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RestaurantInput, User};
    use crate::infrastructure::db::test_support::memory_db;
    use crate::infrastructure::db::{RestaurantRepository, UserRepository};

    #[tokio::test]
    async fn test_exists_and_count() {
        let db = memory_db().await;
        let votes = VoteRepository::new(db.clone());
        let restaurant = RestaurantRepository::new(db.clone())
            .create(&RestaurantInput {
                name: Some("Diner".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let user = UserRepository::new(db.clone())
            .upsert_google(&User::new("g-1".into(), "u@example.com".into(), "U".into(), None))
            .await
            .unwrap();

        assert!(!votes.exists(user.id, restaurant.id).await.unwrap());
        assert_eq!(votes.count(restaurant.id).await.unwrap(), 0);

        let recorded = votes
            .record(user.id, restaurant.id, VoteDirection::Down)
            .await
            .unwrap();
        assert_eq!(recorded.direction, vote::Direction::Down);
        votes
            .record(user.id, restaurant.id, VoteDirection::Down)
            .await
            .unwrap();

        assert!(votes.exists(user.id, restaurant.id).await.unwrap());
        assert_eq!(votes.count(restaurant.id).await.unwrap(), 2);
    }
}
