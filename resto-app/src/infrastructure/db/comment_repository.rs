use super::entities::{comment, restaurant, Comment, Restaurant};
use crate::domain::{self, CommentInput};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<domain::Comment>, DbErr> {
        let models = Comment::find()
            .inner_join(Restaurant)
            .filter(restaurant::Column::Active.eq(true))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(domain::Comment::from).collect())
    }

    pub async fn find_visible(&self, id: i32) -> Result<Option<comment::Model>, DbErr> {
        Comment::find_by_id(id)
            .inner_join(Restaurant)
            .filter(restaurant::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, user_id: Uuid, input: &CommentInput) -> Result<domain::Comment, DbErr> {
        let active = comment::ActiveModel {
            restaurant_id: Set(input.restaurant.unwrap_or_default()),
            user_id: Set(user_id),
            text: Set(input.text.clone().unwrap_or_default()),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        };
        let model = active.insert(&self.db).await?;
        tracing::info!(comment_id = model.id, restaurant_id = model.restaurant_id, "Comment posted");
        Ok(model.into())
    }

    pub async fn update(
        &self,
        model: comment::Model,
        input: &CommentInput,
    ) -> Result<domain::Comment, DbErr> {
        if *input == CommentInput::default() {
            return Ok(model.into());
        }
        let mut active: comment::ActiveModel = model.into();
        if let Some(restaurant_id) = input.restaurant {
            active.restaurant_id = Set(restaurant_id);
        }
        if let Some(text) = &input.text {
            active.text = Set(text.clone());
        }
        Ok(active.update(&self.db).await?.into())
    }

    pub async fn delete(&self, model: comment::Model) -> Result<(), DbErr> {
        model.delete(&self.db).await?;
        Ok(())
    }
}

impl From<comment::Model> for domain::Comment {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            restaurant: model.restaurant_id,
            user: model.user_id,
            text: model.text,
            created_at: model.created_at,
        }
    }
}
