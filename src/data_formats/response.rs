use serde::{Deserialize, Serialize};

use crate::models::{Ingredient, Recipe, RecipeIngredient, RecipeSummary, Tag, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            email,
            username,
            first_name,
            last_name,
            avatar,
            ..
        }: User,
        is_subscribed: bool,
    ) -> Self {
        UserResponse {
            id,
            email,
            username,
            first_name,
            last_name,
            is_subscribed,
            avatar,
        }
    }
}

/// Profile plus the user's recipes, as returned by the subscription
/// endpoints.
#[derive(Deserialize, Serialize, Debug)]
pub struct UserWithRecipesResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AvatarResponse {
    pub avatar: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(Tag { id, name, slug }: Tag) -> Self {
        TagResponse { id, name, slug }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(
        Ingredient {
            id,
            name,
            measurement_unit,
        }: Ingredient,
    ) -> Self {
        IngredientResponse {
            id,
            name,
            measurement_unit,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(
        RecipeIngredient {
            id,
            name,
            measurement_unit,
            amount,
        }: RecipeIngredient,
    ) -> Self {
        RecipeIngredientResponse {
            id,
            name,
            measurement_unit,
            amount,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i64,
}

impl From<RecipeSummary> for RecipeSummaryResponse {
    fn from(
        RecipeSummary {
            id,
            name,
            image,
            cooking_time,
        }: RecipeSummary,
    ) -> Self {
        RecipeSummaryResponse {
            id,
            name,
            image,
            cooking_time,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i64,
}

impl RecipeResponse {
    pub fn new(
        Recipe {
            id,
            name,
            image,
            text,
            cooking_time,
            ..
        }: Recipe,
        tags: Vec<Tag>,
        author: UserResponse,
        ingredients: Vec<RecipeIngredient>,
        is_favorited: bool,
        is_in_shopping_cart: bool,
    ) -> Self {
        RecipeResponse {
            id,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            author,
            ingredients: ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name,
            image,
            text,
            cooking_time,
        }
    }
}
