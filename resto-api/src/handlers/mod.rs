pub mod auth;
pub mod comments;
pub mod landing;
pub mod restaurants;
pub mod users;
pub mod visits;
pub mod votes;

use resto_errors::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// A `restaurant` reference in a write must name an active restaurant.
async fn check_restaurant(ctx: &resto_app::AppContext, id: Option<i32>) -> Result<(), AppError> {
    if let Some(id) = id {
        if ctx.restaurants.find_active(id).await?.is_none() {
            return Err(resto_app::domain::payload::missing_reference("restaurant", id).into());
        }
    }
    Ok(())
}
