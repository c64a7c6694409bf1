use super::entities::{restaurant, visit, vote, Restaurant, Visit, Vote};
use crate::domain::{self, OrderField, RestaurantInput, RestaurantQuery, SortOrder};
use sea_orm::sea_query::{Expr, Func, LikeExpr, Order, SimpleExpr};
use sea_orm::{entity::*, query::*, Condition, ConnectionTrait, DatabaseConnection, DbErr};
use std::collections::HashMap;

const VOTE_COUNT: &str =
    "(SELECT COUNT(*) FROM votes WHERE votes.restaurant_id = restaurants.id)";

/// Read and write access to restaurants. Every lookup is restricted to
/// active rows; an inactive restaurant behaves as if it did not exist.
#[derive(Clone)]
pub struct RestaurantRepository {
    db: DatabaseConnection,
}

impl RestaurantRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_active(&self, id: i32) -> Result<Option<restaurant::Model>, DbErr> {
        Restaurant::find_by_id(id)
            .filter(restaurant::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<domain::Restaurant>, DbErr> {
        match self.find_active(id).await? {
            Some(model) => {
                let votes = self.vote_counts(&[model.id]).await?;
                Ok(Some(to_domain(model, &votes)))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self, query: &RestaurantQuery) -> Result<Vec<domain::Restaurant>, DbErr> {
        let mut select = Restaurant::find().filter(restaurant::Column::Active.eq(true));

        for term in &query.search {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(restaurant::Column::Name, term))
                    .add(contains_ci(restaurant::Column::Description, term)),
            );
        }

        for (field, order) in &query.ordering {
            let order = sort_order(*order);
            select = match field {
                OrderField::Id => select.order_by(restaurant::Column::Id, order),
                OrderField::Name => select.order_by(restaurant::Column::Name, order),
                OrderField::Rating => select.order_by(restaurant::Column::Rating, order),
                OrderField::Votes => select.order_by(Expr::cust(VOTE_COUNT), order),
            };
        }

        let models = select
            .order_by_asc(restaurant::Column::Id)
            .all(&self.db)
            .await?;
        self.with_votes(models).await
    }

    /// First `limit` active restaurants by id, for the landing page.
    pub async fn landing(&self, limit: u64) -> Result<Vec<domain::Restaurant>, DbErr> {
        let models = Restaurant::find()
            .filter(restaurant::Column::Active.eq(true))
            .order_by_asc(restaurant::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.with_votes(models).await
    }

    /// `input` must come from a full (non-partial) decode.
    pub async fn create(&self, input: &RestaurantInput) -> Result<domain::Restaurant, DbErr> {
        let active = restaurant::ActiveModel {
            name: Set(input.name.clone().unwrap_or_default()),
            description: Set(input.description.clone().unwrap_or_default()),
            active: Set(input.active.unwrap_or(true)),
            rating: Set(None),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        };
        let model = active.insert(&self.db).await?;
        tracing::info!(restaurant_id = model.id, "Restaurant created");
        Ok(to_domain(model, &HashMap::new()))
    }

    pub async fn update(
        &self,
        model: restaurant::Model,
        input: &RestaurantInput,
    ) -> Result<domain::Restaurant, DbErr> {
        let model = if input.is_empty() {
            model
        } else {
            let mut active: restaurant::ActiveModel = model.into();
            if let Some(name) = &input.name {
                active.name = Set(name.clone());
            }
            if let Some(description) = &input.description {
                active.description = Set(description.clone());
            }
            if let Some(flag) = input.active {
                active.active = Set(flag);
            }
            active.update(&self.db).await?
        };
        let votes = self.vote_counts(&[model.id]).await?;
        Ok(to_domain(model, &votes))
    }

    /// Soft delete: the row stays, but drops out of every listing.
    pub async fn deactivate(&self, model: restaurant::Model) -> Result<(), DbErr> {
        let id = model.id;
        let mut active: restaurant::ActiveModel = model.into();
        active.active = Set(false);
        active.update(&self.db).await?;
        tracing::info!(restaurant_id = id, "Restaurant deactivated");
        Ok(())
    }

    async fn with_votes(
        &self,
        models: Vec<restaurant::Model>,
    ) -> Result<Vec<domain::Restaurant>, DbErr> {
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let votes = self.vote_counts(&ids).await?;
        Ok(models.into_iter().map(|m| to_domain(m, &votes)).collect())
    }

    async fn vote_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64)> = Vote::find()
            .select_only()
            .column(vote::Column::RestaurantId)
            .column_as(Expr::col((vote::Entity, vote::Column::Id)).count(), "votes")
            .filter(vote::Column::RestaurantId.is_in(ids.iter().copied()))
            .group_by(vote::Column::RestaurantId)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}

/// Recompute a restaurant's rating as the mean of its rated visits.
pub(crate) async fn refresh_rating<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: i32,
) -> Result<Option<f64>, DbErr> {
    let ratings: Vec<Option<i16>> = Visit::find()
        .select_only()
        .column(visit::Column::Rating)
        .filter(visit::Column::RestaurantId.eq(restaurant_id))
        .into_tuple()
        .all(conn)
        .await?;
    let rated: Vec<f64> = ratings.into_iter().flatten().map(f64::from).collect();
    let rating = (!rated.is_empty()).then(|| rated.iter().sum::<f64>() / rated.len() as f64);

    Restaurant::update_many()
        .col_expr(restaurant::Column::Rating, Expr::value(rating))
        .filter(restaurant::Column::Id.eq(restaurant_id))
        .exec(conn)
        .await?;
    tracing::debug!(restaurant_id, ?rating, "Rating refreshed");
    Ok(rating)
}

fn contains_ci(column: restaurant::Column, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_");
    Expr::expr(Func::lower(Expr::col((restaurant::Entity, column))))
        .like(LikeExpr::new(format!("%{escaped}%")).escape('!'))
}

fn sort_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

fn to_domain(model: restaurant::Model, votes: &HashMap<i32, u64>) -> domain::Restaurant {
    domain::Restaurant {
        votes: votes.get(&model.id).copied().unwrap_or(0),
        id: model.id,
        name: model.name,
        description: model.description,
        active: model.active,
        rating: model.rating,
        created_at: model.created_at,
    }
}
