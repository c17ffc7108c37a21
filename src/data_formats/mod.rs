mod request;
mod response;

pub use request::*;
pub use response::*;

use serde::Deserialize;

/// Filters for `GET /api/recipes`. Parsed by hand from the raw query string
/// because `tags` may repeat (`?tags=breakfast&tags=lunch`), which the
/// form-deserializing `Query` extractor cannot express.
#[derive(Debug, Default)]
pub struct RecipeQueryParams {
    pub author: Option<i64>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RecipeQueryParams {
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = RecipeQueryParams::default();
        let raw = match raw {
            Some(raw) => raw,
            None => return params,
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "author" => params.author = value.parse().ok(),
                "tags" => params.tags.push(value.into_owned()),
                "is_favorited" => params.is_favorited = value == "1",
                "is_in_shopping_cart" => params.is_in_shopping_cart = value == "1",
                "limit" => params.limit = value.parse().ok(),
                "offset" => params.offset = value.parse().ok(),
                _ => {}
            }
        }
        params
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct IngredientQueryParams {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SubscriptionQueryParams {
    pub recipes_limit: Option<i64>,
}
