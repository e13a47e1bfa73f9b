use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use larder::agent::{FakeProvider, ModelReply};
use larder::config::{Config, DataConfig, JwtConfig, LlmConfig, ObservabilityConfig, ServerConfig};
use larder::routes::{AppState, router};
use larder_recipe::{DietPreferences, io};
use serde_json::Value;
use temp_dir::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration_test_secret_at_least_32_chars";

const RECIPES: &str = "\
Recipe_Name,Diet,Calories,Protein_g,Carbs_g,Fat_g,Ingredients
Keto Chicken Supreme,keto,650,75,8,45,chicken:250;cheese:100;spinach:100
Keto Salmon Plate,keto,600,55,6,42,salmon:250;spinach:150;cheese:75
Keto Power Breakfast,keto,550,45,5,42,eggs:200;cheese:100;spinach:100
Vegan Tofu Scramble,vegan,300,25,20,18,tofu:250;tomatoes:100;spinach:100
";

const INGREDIENTS: &str = "\
Ingredient,Quantity,Unit
chicken,5000,grams
salmon,5000,grams
cheese,5000,grams
spinach,5000,grams
eggs,5000,grams
";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<FakeProvider>,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_replies(Vec::new()).await
    }

    /// App over a fresh data directory; the chat model answers with `replies`.
    pub async fn with_replies(replies: Vec<ModelReply>) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        std::fs::write(dir.child("recipes.csv"), RECIPES)?;
        std::fs::write(dir.child("available_ingredients.csv"), INGREDIENTS)?;
        io::save_diet_preferences(dir.child("diet_preferences.json"), &DietPreferences::builtin())?;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            data: DataConfig::new(dir.path()),
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                expiration_minutes: 30,
            },
            llm: LlmConfig::default(),
            observability: ObservabilityConfig::default(),
        };

        let provider = Arc::new(FakeProvider::new(replies));
        let state = AppState::new(config, provider.clone()).await?;

        Ok(Self {
            router: router(state),
            provider,
            dir,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None, None).await
    }

    /// Register `sam` and return a bearer token.
    pub async fn token(&self) -> anyhow::Result<String> {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({"username": "sam", "password": "correct horse"})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {body}");
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no access token in {body}"))
    }
}
