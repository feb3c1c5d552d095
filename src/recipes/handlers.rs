use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::entitlements::{Access, USER_ID_HEADER};
use crate::http::{ApiError, AppState};
use crate::recipes::model::{Recipe, RecipeSummary};

/// Recipe detail, with the caller's remaining free views when one was spent.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_recipes_remaining: Option<u32>,
}

pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<RecipeSummary>> {
    Json(state.catalog.list())
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RecipeDetail>, ApiError> {
    let recipe = state
        .catalog
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Recipe '{}' not found", id)))?;

    if !recipe.premium {
        return Ok(Json(RecipeDetail {
            recipe,
            free_recipes_remaining: None,
        }));
    }

    let user = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Sign in to view premium recipes".into()))?;

    match state.entitlements.authorize(user, true) {
        Access::Granted => Ok(Json(RecipeDetail {
            recipe,
            free_recipes_remaining: None,
        })),
        Access::GrantedFree { remaining } => {
            tracing::debug!(user = %user, recipe = %id, remaining, "Spent free premium view");
            Ok(Json(RecipeDetail {
                recipe,
                free_recipes_remaining: Some(remaining),
            }))
        }
        Access::Denied => Err(ApiError::PaymentRequired(
            "Subscribe to view premium recipes".into(),
        )),
    }
}
