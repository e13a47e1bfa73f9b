use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use larder_db::RecipeStore;
use tower_http::cors::CorsLayer;

use crate::agent::{LlmProvider, RecipeAgent};
use crate::config::Config;
use crate::error::ApiResult;
use crate::store::DataStore;

mod auth;
mod chat;
mod grocery;
mod health;
mod ingredients;
mod meal_plan;
mod nutrition;
mod preferences;
mod recipes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub data: Arc<DataStore>,
    pub recipe_store: RecipeStore,
    pub agent: Arc<RecipeAgent>,
}

impl AppState {
    /// Load the data files and build the SQL view the agent queries.
    pub async fn new(config: Config, provider: Arc<dyn LlmProvider>) -> anyhow::Result<Self> {
        let data = DataStore::new(config.data.clone());
        let recipe_store = RecipeStore::load(
            &data.recipes()?,
            &data.main_ingredients()?,
            &data.user_ingredients()?,
        )
        .await?;
        let agent = RecipeAgent::new(provider, recipe_store.clone());

        Ok(Self {
            config,
            data: Arc::new(data),
            recipe_store,
            agent: Arc::new(agent),
        })
    }

    pub(crate) async fn refresh_recipes(&self) -> ApiResult<()> {
        self.recipe_store
            .replace_recipes(&self.data.recipes()?)
            .await?;
        Ok(())
    }

    pub(crate) async fn refresh_ingredients(&self) -> ApiResult<()> {
        self.recipe_store
            .replace_ingredients(&self.data.main_ingredients()?, &self.data.user_ingredients()?)
            .await?;
        Ok(())
    }
}

pub fn router(app_state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/ingredients",
            get(ingredients::list).post(ingredients::upsert),
        )
        .route("/ingredients/{name}", delete(ingredients::remove))
        .route("/ingredients/grocery-list", post(grocery::for_recipes))
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route("/recipes/suggestions", get(recipes::suggestions))
        .route(
            "/recipes/{name}",
            get(recipes::detail).delete(recipes::remove),
        )
        .route("/diets", get(preferences::diets))
        .route(
            "/preferences",
            get(preferences::current).post(preferences::update),
        )
        .route(
            "/meal-plan",
            get(meal_plan::current).post(meal_plan::regenerate),
        )
        .route("/calculate-nutrition", post(nutrition::calculate))
        .route("/grocery-list", get(grocery::for_current_plan))
        .route("/chat", post(chat::chat))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
