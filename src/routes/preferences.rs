use axum::{Json, extract::State};
use larder_recipe::{DietPreferences, NutritionalGoals};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::store::UserProfile;

#[derive(Debug, Serialize)]
pub struct PreferencesView {
    pub name: String,
    #[serde(rename = "dietaryGoal")]
    pub dietary_goal: String,
    #[serde(rename = "nutritionalGoals")]
    pub nutritional_goals: Option<NutritionalGoals>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreferencesUpdate {
    #[validate(length(max = 100))]
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    #[serde(rename = "dietaryGoal")]
    pub dietary_goal: String,
}

/// GET /api/diets - the diet reference table
#[tracing::instrument(skip(state))]
pub async fn diets(State(state): State<AppState>) -> ApiResult<Json<DietPreferences>> {
    Ok(Json(state.data.diet_preferences()?))
}

/// GET /api/preferences
#[tracing::instrument(skip(state))]
pub async fn current(State(state): State<AppState>) -> ApiResult<Json<PreferencesView>> {
    let preferences = state.data.diet_preferences()?;
    let user_data = state.data.user_data()?;

    let (name, dietary_goal) = match user_data.current() {
        Some(user) if !user.dietary_goal.trim().is_empty() => {
            (user.name.clone(), user.dietary_goal.clone())
        }
        other => (
            other.map(|user| user.name.clone()).unwrap_or_default(),
            preferences
                .default_diet()
                .map(|entry| entry.diet.clone())
                .unwrap_or_default(),
        ),
    };
    let nutritional_goals = preferences.goals_for(&dietary_goal).copied();

    Ok(Json(PreferencesView {
        name,
        dietary_goal,
        nutritional_goals,
    }))
}

/// POST /api/preferences - switching diet drops the stored plan
#[tracing::instrument(skip(state, payload), fields(user = %user.0, diet = %payload.dietary_goal))]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PreferencesUpdate>,
) -> ApiResult<Json<PreferencesView>> {
    payload.validate()?;

    let preferences = state.data.diet_preferences()?;
    let goals = preferences
        .goals_for(&payload.dietary_goal)
        .copied()
        .ok_or_else(|| {
            let known: Vec<&str> = preferences.diets().collect();
            ApiError::BadRequest(format!(
                "Unknown diet '{}'. Available diets: {}",
                payload.dietary_goal,
                known.join(", ")
            ))
        })?;
    let dietary_goal = payload.dietary_goal.trim().to_lowercase();

    let profile = state
        .data
        .update_user_data(|data| -> ApiResult<UserProfile> {
            match data.current_mut() {
                Some(current) => {
                    if !current.dietary_goal.eq_ignore_ascii_case(&dietary_goal) {
                        current.current_meal_plan = None;
                        current.meal_plan_diet = None;
                    }
                    current.name = payload.name.clone();
                    current.dietary_goal = dietary_goal.clone();
                }
                None => data.users.push(UserProfile {
                    name: payload.name.clone(),
                    dietary_goal: dietary_goal.clone(),
                    current_meal_plan: None,
                    meal_plan_diet: None,
                }),
            }
            data.current()
                .cloned()
                .ok_or_else(|| ApiError::InternalError("user profile missing".to_string()))
        })
        .await?;

    tracing::info!("Updated preferences");
    Ok(Json(PreferencesView {
        name: profile.name,
        dietary_goal: profile.dietary_goal,
        nutritional_goals: Some(goals),
    }))
}
