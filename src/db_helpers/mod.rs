use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

mod favorite_helpers;
mod ingredient_helpers;
mod recipe_helpers;
mod subscription_helpers;
mod tag_helpers;
mod user_helpers;

pub use favorite_helpers::*;
pub use ingredient_helpers::*;
pub use recipe_helpers::*;
pub use subscription_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password, avatar, created_at";

/// Builds a dynamic `UPDATE` for partial profile updates; columns with no
/// submitted value are left untouched.
struct UpdateBuilder {
    assignments: Vec<&'static str>,
    params: Vec<String>,
}

impl UpdateBuilder {
    fn new() -> Self {
        Self {
            assignments: Vec::new(),
            params: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.assignments.push(column);
            self.params.push(value);
        }
        self
    }

    /// Returns `None` when nothing was set.
    fn build(self, table: &'static str) -> Option<(String, Vec<String>)> {
        if self.assignments.is_empty() {
            return None;
        }
        let assignments = self
            .assignments
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        Some((
            format!("UPDATE {table} SET {assignments} WHERE id = ?"),
            self.params,
        ))
    }
}

/// Formats ids as a SQL `IN` list. Ids come from typed request fields, never
/// raw text. Empty input yields `(NULL)`, which matches nothing.
fn id_list(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "(NULL)".to_string();
    }
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({joined})")
}

// ----------------- Shared Helper Functions -----------------

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let result = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let result = sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_builder_skips_missing_columns() {
        let (query, params) = UpdateBuilder::new()
            .set("email", Some("new@example.com".to_string()))
            .set("username", None)
            .set("first_name", Some("Nina".to_string()))
            .build("users")
            .unwrap();
        assert_eq!(query, "UPDATE users SET email = ?, first_name = ? WHERE id = ?");
        assert_eq!(params, vec!["new@example.com", "Nina"]);
    }

    #[test]
    fn update_builder_with_no_values_builds_nothing() {
        assert!(UpdateBuilder::new().set("email", None).build("users").is_none());
    }

    #[test]
    fn id_list_formats_in_clause() {
        assert_eq!(id_list(&[1, 2, 3]), "(1, 2, 3)");
        assert_eq!(id_list(&[]), "(NULL)");
    }
}
