use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Read projection of a user document. Carries no credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub playlists: Vec<i64>,
}

/// The only projection that includes the password hash; used by login.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredential {
    pub user_id: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub playlists: Json<Vec<i64>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            playlists: row.playlists.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_has_no_credential() {
        let user = User {
            id: 1,
            user_id: "u1".into(),
            name: "Ada".into(),
            playlists: vec![3, 4],
        };
        let v = serde_json::to_value(&user).unwrap();
        assert_eq!(v["userID"], "u1");
        assert_eq!(v["playlists"], serde_json::json!([3, 4]));
        assert!(v.get("password").is_none());
    }
}
