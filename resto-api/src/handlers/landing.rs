use axum::extract::State;
use axum::response::Html;
use minijinja::{context, Environment};
use resto_app::AppContext;
use resto_errors::AppError;

const LANDING_LIMIT: u64 = 50;
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Read-only landing page listing the first active restaurants.
pub async fn index(State(ctx): State<AppContext>) -> Result<Html<String>, AppError> {
    let restaurants = ctx.restaurants.landing(LANDING_LIMIT).await?;

    // The `.html` name turns on auto-escaping.
    let env = Environment::new();
    let page = env
        .template_from_named_str("index.html", INDEX_TEMPLATE)
        .and_then(|template| template.render(context! { restaurants }))
        .map_err(|e| AppError::Internal(format!("Template rendering failed: {e}")))?;
    Ok(Html(page))
}
