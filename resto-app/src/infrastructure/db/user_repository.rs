use super::entities::{user, visit, User, Visit};
use super::restaurant_repository::refresh_rating;
use crate::domain::{self, UserInput};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::GoogleId.eq(google_id))
            .one(&self.db)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    pub async fn list(&self) -> Result<Vec<domain::User>, DbErr> {
        let models = User::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(domain::User::from).collect())
    }

    /// `input` must come from a full decode; email uniqueness is checked by
    /// the caller.
    pub async fn create(&self, input: &UserInput) -> Result<domain::User, DbErr> {
        let now = chrono::Utc::now();
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            google_id: Set(None),
            email: Set(input.email.clone().unwrap_or_default()),
            name: Set(input.name.clone().unwrap_or_default()),
            avatar_url: Set(input.avatar_url.clone().flatten()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        let model = active.insert(&self.db).await?;
        tracing::info!(user_id = %model.id, "User created");
        Ok(model.into())
    }

    pub async fn update(&self, model: user::Model, input: &UserInput) -> Result<domain::User, DbErr> {
        let mut active: user::ActiveModel = model.into();
        if let Some(email) = &input.email {
            active.email = Set(email.clone());
        }
        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        if let Some(avatar_url) = &input.avatar_url {
            active.avatar_url = Set(avatar_url.clone());
        }
        active.updated_at = Set(Some(chrono::Utc::now()));
        Ok(active.update(&self.db).await?.into())
    }

    /// Deleting a user cascades to their visits, so the ratings of every
    /// restaurant they visited are recomputed in the same transaction.
    pub async fn delete(&self, model: user::Model) -> Result<(), DbErr> {
        let id = model.id;

        let txn = self.db.begin().await?;
        let visited: Vec<i32> = Visit::find()
            .select_only()
            .column(visit::Column::RestaurantId)
            .filter(visit::Column::UserId.eq(id))
            .distinct()
            .into_tuple()
            .all(&txn)
            .await?;
        model.delete(&txn).await?;
        for restaurant_id in &visited {
            refresh_rating(&txn, *restaurant_id).await?;
        }
        txn.commit().await?;

        tracing::info!(user_id = %id, restaurants = visited.len(), "User deleted");
        Ok(())
    }

    /// Sign-in from Google: refresh the profile of a known account, link an
    /// existing account with the same email, or register a new one. A
    /// changed Google email that another account already uses is not copied.
    pub async fn upsert_google(&self, profile: &domain::User) -> Result<user::Model, DbErr> {
        let google_id = profile.google_id.clone().unwrap_or_default();
        let existing = match self.find_by_google_id(&google_id).await? {
            Some(found) => Some(found),
            None => self.find_by_email(&profile.email).await?,
        };

        if let Some(existing) = existing {
            let email_taken = existing.email != profile.email
                && self
                    .find_by_email(&profile.email)
                    .await?
                    .is_some_and(|other| other.id != existing.id);
            if email_taken {
                tracing::warn!(
                    user_id = %existing.id,
                    "Google email belongs to another account; keeping the stored email"
                );
            }

            let mut active: user::ActiveModel = existing.into();
            active.google_id = Set(Some(google_id));
            if !email_taken {
                active.email = Set(profile.email.clone());
            }
            active.name = Set(profile.name.clone());
            active.avatar_url = Set(profile.avatar_url.clone());
            active.updated_at = Set(Some(chrono::Utc::now()));
            active.update(&self.db).await
        } else {
            let now = chrono::Utc::now();
            let active = user::ActiveModel {
                id: Set(profile.id),
                google_id: Set(Some(google_id)),
                email: Set(profile.email.clone()),
                name: Set(profile.name.clone()),
                avatar_url: Set(profile.avatar_url.clone()),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            };
            let model = active.insert(&self.db).await?;
            tracing::info!(user_id = %model.id, "Registered user from Google sign-in");
            Ok(model)
        }
    }
}

impl From<user::Model> for domain::User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            google_id: model.google_id,
            email: model.email,
            name: model.name,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
