use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::services::password_policy::must_change_password;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoginPayload {
    #[serde(alias = "Username")]
    pub username: Option<String>,
    #[serde(alias = "Password")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[serde(alias = "CurrentPassword")]
    pub current_password: Option<String>,
    #[serde(alias = "NewPassword")]
    pub new_password: Option<String>,
}

/// User projection sent to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_login: bool,
    pub is_active: bool,
    pub must_change_password: bool,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub last_password_change: Option<DateTime<Utc>>,
}

impl UserResponse {
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            first_login: user.first_login,
            is_active: user.is_active,
            must_change_password: must_change_password(
                user.role(),
                user.last_password_change,
                now,
            ),
            position: user.position.clone(),
            phone: user.phone.clone(),
            last_password_change: user.last_password_change,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
