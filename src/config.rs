use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Flat files the store reads and writes. Relative file names resolve
/// against `dir`.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub dir: PathBuf,
    #[serde(default = "default_recipes_file")]
    pub recipes_file: String,
    #[serde(default = "default_ingredients_file")]
    pub ingredients_file: String,
    #[serde(default = "default_user_ingredients_file")]
    pub user_ingredients_file: String,
    #[serde(default = "default_diet_preferences_file")]
    pub diet_preferences_file: String,
    #[serde(default = "default_user_data_file")]
    pub user_data_file: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_grocery_list_file")]
    pub grocery_list_file: String,
    #[serde(default = "default_meal_plan_file")]
    pub meal_plan_file: String,
}

impl DataConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recipes_file: default_recipes_file(),
            ingredients_file: default_ingredients_file(),
            user_ingredients_file: default_user_ingredients_file(),
            diet_preferences_file: default_diet_preferences_file(),
            user_data_file: default_user_data_file(),
            users_file: default_users_file(),
            grocery_list_file: default_grocery_list_file(),
            meal_plan_file: default_meal_plan_file(),
        }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

fn default_recipes_file() -> String {
    "recipes.csv".to_string()
}

fn default_ingredients_file() -> String {
    "available_ingredients.csv".to_string()
}

fn default_user_ingredients_file() -> String {
    "user_available_ingredients.csv".to_string()
}

fn default_diet_preferences_file() -> String {
    "diet_preferences.json".to_string()
}

fn default_user_data_file() -> String {
    "user_data.json".to_string()
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_grocery_list_file() -> String {
    "grocery_list.csv".to_string()
}

fn default_meal_plan_file() -> String {
    "meal_plan.txt".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

fn default_expiration_minutes() -> i64 {
    30
}

/// OpenAI-compatible chat completions endpoint. The chat route answers
/// with an error message while `api_key` is empty.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LARDER__DATA__DIR, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("data.dir", "data")?
            .set_default("jwt.secret", "")?
            .set_default("jwt.expiration_minutes", 30)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("LARDER")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("jwt.secret", jwt_secret)?;
        }
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            builder = builder.set_override("llm.api_key", api_key)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.jwt.expiration_minutes < 1 {
            return Err("JWT expiration must be at least 1 minute".to_string());
        }
        if self.data.dir.as_os_str().is_empty() {
            return Err("Data directory must not be empty".to_string());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        Ok(())
    }
}
