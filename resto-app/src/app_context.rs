use crate::application::{GoogleSignIn, Voting};
use crate::config::Config;
use crate::infrastructure::auth::GoogleOAuth;
use crate::infrastructure::db::{
    self, CommentRepository, RestaurantRepository, UserRepository, VisitRepository,
    VoteRepository,
};
use resto_errors::AppError;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;

/// Everything a request handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    pub restaurants: RestaurantRepository,
    pub visits: VisitRepository,
    pub comments: CommentRepository,
    pub users: UserRepository,
    pub voting: Arc<Voting>,
    pub google: Option<Arc<GoogleSignIn>>,
}

impl AppContext {
    /// Wire repositories and use cases over an already-migrated connection.
    pub fn new(db: DatabaseConnection) -> Self {
        let restaurants = RestaurantRepository::new(db.clone());
        let votes = VoteRepository::new(db.clone());
        Self {
            visits: VisitRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            voting: Arc::new(Voting::new(restaurants.clone(), votes)),
            restaurants,
            google: None,
            db,
        }
    }

    pub fn with_google(mut self, oauth: GoogleOAuth) -> Self {
        self.google = Some(Arc::new(GoogleSignIn::new(oauth, self.users.clone())));
        self
    }

    /// Open the database, create missing tables and configure Google
    /// sign-in when credentials are present.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let db = db::create_connection(&config.database_url).await?;
        db::run_migrations(&db).await?;
        tracing::info!("Database ready");

        let ctx = Self::new(db);
        match &config.google {
            Some(google) => {
                let oauth = GoogleOAuth::new(
                    &google.client_id,
                    &google.client_secret,
                    &google.redirect_url,
                )?;
                tracing::info!("Google sign-in enabled");
                Ok(ctx.with_google(oauth))
            }
            None => {
                tracing::warn!("Google OAuth is not configured; sign-in routes are disabled");
                Ok(ctx)
            }
        }
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await?;
        tracing::info!("Database connection closed");
        Ok(())
    }
}
