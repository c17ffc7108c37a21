use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery},
    http::{header, StatusCode, Uri},
    Extension, Json,
};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    authentication::{get_auth_token, hash_password, verify_password, AuthUser, MaybeUser},
    db_helpers::{
        add_favorite_in_db, add_to_cart_in_db, clear_avatar_in_db, count_recipes_by_author_in_db,
        delete_recipe_in_db, get_cart_lines_in_db, get_ingredient_in_db,
        get_ingredients_for_recipe_in_db, get_recipe_in_db, get_recipes_by_author_in_db,
        get_tag_in_db, get_tags_for_recipe_in_db, get_user_by_email, get_user_by_id,
        insert_recipe_in_db, insert_user, is_favorited_in_db, is_in_cart_in_db,
        is_subscribed_in_db, list_followed_users_in_db, list_ingredients_in_db, list_recipes_in_db,
        list_tags_in_db, list_users_in_db, remove_favorite_in_db, remove_from_cart_in_db,
        set_avatar_in_db, set_password_in_db, subscribe_in_db, unsubscribe_in_db,
        update_recipe_in_db, update_user_in_db,
    },
    errors::RequestError,
    models::{Recipe, User},
    shopping_list::{aggregate_cart, render_shopping_list},
    AvatarResponse, IngredientQueryParams, IngredientResponse, JsonResponse, LoginRequest,
    RecipeQueryParams, RecipeRequest, RecipeResponse, RecipeSummaryResponse, RegisterRequest,
    SetAvatarRequest, SetPasswordRequest, SubscriptionQueryParams, TagResponse, TokenResponse,
    UpdateProfileRequest, UserResponse, UserWithRecipesResponse,
};

type JsonResult<T> = Result<Json<T>, JsonResponse<Value>>;
type CreatedResult<T> = Result<JsonResponse<T>, JsonResponse<Value>>;
type NoContentResult = Result<StatusCode, JsonResponse<Value>>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn map_user_unique_violation(e: RequestError) -> JsonResponse<Value> {
    match e.unique_violation_column() {
        Some("users.email") => {
            RequestError::Validation("email", "A user with this email already exists")
        }
        Some("users.username") => {
            RequestError::Validation("username", "A user with this username already exists")
        }
        _ => e,
    }
    .to_json_response()
}

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(mut request): Json<RegisterRequest>,
) -> CreatedResult<UserResponse> {
    request.password = hash_password(request.password)
        .await
        .map_err(|_| RequestError::ServerError.to_json_response())?;

    let user = insert_user(&pool, &request)
        .await
        .map_err(map_user_unique_violation)?;

    Ok((StatusCode::CREATED, Json(UserResponse::new(user, false))))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<TokenResponse> {
    let user = get_user_by_email(&pool, &request.email)
        .await
        .map_err(|e| e.to_json_response())?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::Validation(
                "non_field_errors",
                "Unable to log in with provided credentials",
            )
            .to_json_response());
        }
    };
    let is_password_correct = verify_password(request.password, &user.password)
        .await
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    if !is_password_correct {
        return Err(RequestError::Validation(
            "non_field_errors",
            "Unable to log in with provided credentials",
        )
        .to_json_response());
    }

    let auth_token = get_auth_token(user.id)
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    Ok(Json(TokenResponse { auth_token }))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> JsonResult<UserResponse> {
    let user = get_user_by_id(&pool, user.id)
        .await
        .map_err(|e| e.to_json_response())?
        .ok_or_else(|| RequestError::NotFound.to_json_response())?;
    Ok(Json(UserResponse::new(user, false)))
}

pub async fn update_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> JsonResult<UserResponse> {
    let user = update_user_in_db(&pool, user.id, request)
        .await
        .map_err(map_user_unique_violation)?;
    Ok(Json(UserResponse::new(user, false)))
}

pub async fn set_password(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(request): Json<SetPasswordRequest>,
) -> NoContentResult {
    let current = get_user_by_id(&pool, user.id)
        .await
        .map_err(|e| e.to_json_response())?
        .ok_or_else(|| RequestError::NotFound.to_json_response())?;

    let is_password_correct = verify_password(request.current_password, &current.password)
        .await
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    if !is_password_correct {
        return Err(RequestError::Validation(
            "current_password",
            "Current password is incorrect",
        )
        .to_json_response());
    }

    let new_hash = hash_password(request.new_password)
        .await
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    set_password_in_db(&pool, user.id, &new_hash)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_avatar(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(request): Json<SetAvatarRequest>,
) -> JsonResult<AvatarResponse> {
    let avatar = match request.avatar {
        Some(avatar) if !avatar.is_empty() => avatar,
        _ => {
            return Err(
                RequestError::Validation("avatar", "This field is required").to_json_response()
            );
        }
    };
    set_avatar_in_db(&pool, user.id, &avatar)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(AvatarResponse {
        avatar: Some(avatar),
    }))
}

pub async fn delete_avatar(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> NoContentResult {
    clear_avatar_in_db(&pool, user.id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    Extension(pool): Extension<Arc<SqlitePool>>,
    viewer: MaybeUser,
) -> JsonResult<Vec<UserResponse>> {
    let users = list_users_in_db(&pool)
        .await
        .map_err(|e| e.to_json_response())?;

    let mut responses = Vec::with_capacity(users.len());
    for user in users {
        let is_subscribed = match viewer.get_id() {
            Some(viewer_id) => is_subscribed_in_db(&pool, viewer_id, user.id)
                .await
                .map_err(|e| e.to_json_response())?,
            None => false,
        };
        responses.push(UserResponse::new(user, is_subscribed));
    }
    Ok(Json(responses))
}

pub async fn get_user_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<UserResponse> {
    let user = get_user_by_id(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?
        .ok_or_else(|| RequestError::NotFound.to_json_response())?;
    let is_subscribed = match viewer.get_id() {
        Some(viewer_id) => is_subscribed_in_db(&pool, viewer_id, user.id)
            .await
            .map_err(|e| e.to_json_response())?,
        None => false,
    };
    Ok(Json(UserResponse::new(user, is_subscribed)))
}

// ----------------- Subscription Handlers -----------------

async fn build_subscription_response(
    pool: &SqlitePool,
    user: User,
    recipes_limit: Option<i64>,
) -> Result<UserWithRecipesResponse, RequestError> {
    let recipes = get_recipes_by_author_in_db(pool, user.id, recipes_limit).await?;
    let recipes_count = count_recipes_by_author_in_db(pool, user.id).await?;
    Ok(UserWithRecipesResponse {
        user: UserResponse::new(user, true),
        recipes: recipes
            .into_iter()
            .map(RecipeSummaryResponse::from)
            .collect(),
        recipes_count,
    })
}

pub async fn list_subscriptions(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Query(params): Query<SubscriptionQueryParams>,
) -> JsonResult<Vec<UserWithRecipesResponse>> {
    let followed = list_followed_users_in_db(&pool, user.id)
        .await
        .map_err(|e| e.to_json_response())?;

    let mut responses = Vec::with_capacity(followed.len());
    for followed_user in followed {
        responses.push(
            build_subscription_response(&pool, followed_user, params.recipes_limit)
                .await
                .map_err(|e| e.to_json_response())?,
        );
    }
    Ok(Json(responses))
}

pub async fn subscribe_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Query(params): Query<SubscriptionQueryParams>,
) -> CreatedResult<UserWithRecipesResponse> {
    let following = subscribe_in_db(&pool, user.id, id).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::BadRequest("You are already subscribed to this user")
                .to_json_response();
        }
        e.to_json_response()
    })?;

    let response = build_subscription_response(&pool, following, params.recipes_limit)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn unsubscribe_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> NoContentResult {
    unsubscribe_in_db(&pool, user.id, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Tag Handlers -----------------

pub async fn list_tags(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<Vec<TagResponse>> {
    let tags = list_tags_in_db(&pool)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

pub async fn get_tag(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> JsonResult<TagResponse> {
    let tag = get_tag_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(TagResponse::from(tag)))
}

// ----------------- Ingredient Handlers -----------------

pub async fn list_ingredients(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<IngredientQueryParams>,
) -> JsonResult<Vec<IngredientResponse>> {
    let ingredients = list_ingredients_in_db(&pool, params.name.as_deref())
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

pub async fn get_ingredient(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> JsonResult<IngredientResponse> {
    let ingredient = get_ingredient_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(IngredientResponse::from(ingredient)))
}

// ----------------- Recipe Handlers -----------------

async fn build_recipe_response(
    pool: &SqlitePool,
    recipe: Recipe,
    viewer_id: Option<i64>,
) -> Result<RecipeResponse, RequestError> {
    let tags = get_tags_for_recipe_in_db(pool, recipe.id).await?;
    let ingredients = get_ingredients_for_recipe_in_db(pool, recipe.id).await?;
    let author = get_user_by_id(pool, recipe.author_id)
        .await?
        .ok_or(RequestError::NotFound)?;

    let (is_subscribed, is_favorited, is_in_shopping_cart) = match viewer_id {
        Some(viewer) => (
            is_subscribed_in_db(pool, viewer, author.id).await?,
            is_favorited_in_db(pool, viewer, recipe.id).await?,
            is_in_cart_in_db(pool, viewer, recipe.id).await?,
        ),
        None => (false, false, false),
    };

    Ok(RecipeResponse::new(
        recipe,
        tags,
        UserResponse::new(author, is_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
    ))
}

pub async fn list_recipes(
    Extension(pool): Extension<Arc<SqlitePool>>,
    viewer: MaybeUser,
    RawQuery(raw_query): RawQuery,
) -> JsonResult<Vec<RecipeResponse>> {
    let params = RecipeQueryParams::from_query(raw_query.as_deref());
    let recipes = list_recipes_in_db(&pool, &params, viewer.get_id())
        .await
        .map_err(|e| e.to_json_response())?;

    let mut responses = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        responses.push(
            build_recipe_response(&pool, recipe, viewer.get_id())
                .await
                .map_err(|e| e.to_json_response())?,
        );
    }
    Ok(Json(responses))
}

pub async fn create_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(request): Json<RecipeRequest>,
) -> CreatedResult<RecipeResponse> {
    request.validate().map_err(|e| e.to_json_response())?;

    let recipe_id = insert_recipe_in_db(&pool, user.id, &request)
        .await
        .map_err(|e| e.to_json_response())?;
    let recipe = get_recipe_in_db(&pool, recipe_id)
        .await
        .map_err(|e| e.to_json_response())?;
    let response = build_recipe_response(&pool, recipe, Some(user.id))
        .await
        .map_err(|e| e.to_json_response())?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<RecipeResponse> {
    let recipe = get_recipe_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    let response = build_recipe_response(&pool, recipe, viewer.get_id())
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(response))
}

pub async fn update_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<RecipeRequest>,
) -> JsonResult<RecipeResponse> {
    let recipe = get_recipe_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    if recipe.author_id != user.id {
        return Err(RequestError::Forbidden(
            "You do not have permission to edit this recipe",
        )
        .to_json_response());
    }
    request.validate().map_err(|e| e.to_json_response())?;

    update_recipe_in_db(&pool, id, &request)
        .await
        .map_err(|e| e.to_json_response())?;
    let recipe = get_recipe_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    let response = build_recipe_response(&pool, recipe, Some(user.id))
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(response))
}

pub async fn delete_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> NoContentResult {
    let recipe = get_recipe_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    if recipe.author_id != user.id {
        return Err(RequestError::Forbidden(
            "You do not have permission to delete this recipe",
        )
        .to_json_response());
    }
    delete_recipe_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Favorite / Cart Handlers -----------------

pub async fn add_favorite(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> CreatedResult<RecipeSummaryResponse> {
    let summary = add_favorite_in_db(&pool, user.id, id).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::BadRequest("Recipe is already in favorites").to_json_response();
        }
        e.to_json_response()
    })?;
    Ok((StatusCode::CREATED, Json(RecipeSummaryResponse::from(summary))))
}

pub async fn remove_favorite(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> NoContentResult {
    remove_favorite_in_db(&pool, user.id, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> CreatedResult<RecipeSummaryResponse> {
    let summary = add_to_cart_in_db(&pool, user.id, id).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::BadRequest("Recipe is already in the shopping cart")
                .to_json_response();
        }
        e.to_json_response()
    })?;
    Ok((StatusCode::CREATED, Json(RecipeSummaryResponse::from(summary))))
}

pub async fn remove_from_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> NoContentResult {
    remove_from_cart_in_db(&pool, user.id, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_shopping_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> Result<impl axum::response::IntoResponse, JsonResponse<Value>> {
    let lines = get_cart_lines_in_db(&pool, user.id)
        .await
        .map_err(|e| e.to_json_response())?;
    let body = render_shopping_list(&aggregate_cart(lines));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        body,
    ))
}
