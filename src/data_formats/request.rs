use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct SetAvatarRequest {
    pub avatar: Option<String>,
}

// ----------------- Recipe Requests -----------------
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

/// Payload for both `POST /api/recipes` and `PATCH /api/recipes/:id`; an
/// update replaces the tag and ingredient link sets wholesale, so both
/// operations require the full lists.
#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

impl RecipeRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.ingredients.is_empty() {
            return Err(RequestError::Validation(
                "ingredients",
                "A recipe must contain at least one ingredient",
            ));
        }
        if self.tags.is_empty() {
            return Err(RequestError::Validation(
                "tags",
                "A recipe must have at least one tag",
            ));
        }
        let unique_tags: HashSet<i64> = self.tags.iter().copied().collect();
        if unique_tags.len() != self.tags.len() {
            return Err(RequestError::Validation(
                "tags",
                "Tags must not repeat",
            ));
        }
        if self.ingredients.iter().any(|i| i.amount <= 0) {
            return Err(RequestError::Validation(
                "ingredients",
                "Ingredient amounts must be greater than zero",
            ));
        }
        let unique_ingredients: HashSet<i64> =
            self.ingredients.iter().map(|i| i.id).collect();
        if unique_ingredients.len() != self.ingredients.len() {
            return Err(RequestError::Validation(
                "ingredients",
                "Ingredients must not repeat",
            ));
        }
        if self.cooking_time <= 0 {
            return Err(RequestError::Validation(
                "cooking_time",
                "Cooking time must be greater than zero",
            ));
        }
        Ok(())
    }
}
