use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The signed-in administrator as reported by `POST /login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "admin")]
    pub user: AdminProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_tolerates_sparse_user() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "token": "jwt",
            "user": { "_id": "a1", "email": "admin@society.in" }
        }))
        .unwrap();
        assert_eq!(resp.user.id, "a1");
        assert_eq!(resp.user.name, "");

        let bare: LoginResponse = serde_json::from_value(json!({ "token": "jwt" })).unwrap();
        assert_eq!(bare.user, AdminProfile::default());
    }
}
