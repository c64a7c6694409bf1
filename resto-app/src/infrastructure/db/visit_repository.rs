use super::entities::{restaurant, visit, Restaurant, Visit};
use super::restaurant_repository::refresh_rating;
use crate::domain::{self, VisitInput};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

/// Visits to active restaurants. Each write recomputes the rating of the
/// restaurants it touches inside the same transaction.
#[derive(Clone)]
pub struct VisitRepository {
    db: DatabaseConnection,
}

impl VisitRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<domain::Visit>, DbErr> {
        let models = Visit::find()
            .inner_join(Restaurant)
            .filter(restaurant::Column::Active.eq(true))
            .order_by_asc(visit::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(domain::Visit::from).collect())
    }

    /// A visit whose restaurant is still active.
    pub async fn find_visible(&self, id: i32) -> Result<Option<visit::Model>, DbErr> {
        Visit::find_by_id(id)
            .inner_join(Restaurant)
            .filter(restaurant::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// `input` must come from a full decode and name an active restaurant.
    pub async fn create(&self, user_id: Uuid, input: &VisitInput) -> Result<domain::Visit, DbErr> {
        let restaurant_id = input.restaurant.unwrap_or_default();
        let now = chrono::Utc::now();
        let active = visit::ActiveModel {
            restaurant_id: Set(restaurant_id),
            user_id: Set(user_id),
            rating: Set(input.rating.flatten()),
            visited_at: Set(input.visited_at.unwrap_or(now)),
            created_at: Set(Some(now)),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let model = active.insert(&txn).await?;
        refresh_rating(&txn, restaurant_id).await?;
        txn.commit().await?;

        tracing::info!(visit_id = model.id, restaurant_id, "Visit recorded");
        Ok(model.into())
    }

    pub async fn update(&self, model: visit::Model, input: &VisitInput) -> Result<domain::Visit, DbErr> {
        if *input == VisitInput::default() {
            return Ok(model.into());
        }
        let previous = model.restaurant_id;
        let mut active: visit::ActiveModel = model.into();
        if let Some(restaurant_id) = input.restaurant {
            active.restaurant_id = Set(restaurant_id);
        }
        if let Some(rating) = input.rating {
            active.rating = Set(rating);
        }
        if let Some(visited_at) = input.visited_at {
            active.visited_at = Set(visited_at);
        }

        let txn = self.db.begin().await?;
        let model = active.update(&txn).await?;
        refresh_rating(&txn, model.restaurant_id).await?;
        if previous != model.restaurant_id {
            refresh_rating(&txn, previous).await?;
        }
        txn.commit().await?;
        Ok(model.into())
    }

    pub async fn delete(&self, model: visit::Model) -> Result<(), DbErr> {
        let restaurant_id = model.restaurant_id;
        let id = model.id;

        let txn = self.db.begin().await?;
        model.delete(&txn).await?;
        refresh_rating(&txn, restaurant_id).await?;
        txn.commit().await?;

        tracing::info!(visit_id = id, restaurant_id, "Visit deleted");
        Ok(())
    }
}

impl From<visit::Model> for domain::Visit {
    fn from(model: visit::Model) -> Self {
        Self {
            id: model.id,
            restaurant: model.restaurant_id,
            user: model.user_id,
            rating: model.rating,
            visited_at: model.visited_at,
            created_at: model.created_at,
        }
    }
}
