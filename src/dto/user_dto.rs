use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::auth_dto::UserResponse;
use crate::utils::validation::{validate_phone, validate_role};

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[serde(alias = "Username")]
    #[validate(
        required(message = "Имя пользователя обязательно"),
        length(min = 3, max = 50, message = "Имя пользователя должно содержать от 3 до 50 символов")
    )]
    pub username: Option<String>,
    #[serde(alias = "Email")]
    #[validate(
        required(message = "Email обязателен"),
        email(message = "Некорректный формат email"),
        length(max = 100, message = "Email не должен превышать 100 символов")
    )]
    pub email: Option<String>,
    #[serde(alias = "Password")]
    #[validate(required(message = "Пароль обязателен"))]
    pub password: Option<String>,
    #[serde(alias = "Role")]
    #[validate(
        required(message = "Роль обязательна"),
        custom(function = "validate_role")
    )]
    pub role: Option<String>,
    #[serde(alias = "Position")]
    #[validate(required(message = "Должность обязательна"))]
    pub position: Option<String>,
    #[serde(alias = "Phone")]
    #[validate(
        required(message = "Телефон обязателен"),
        custom(function = "validate_phone")
    )]
    pub phone: Option<String>,
}

fn trim(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl CreateUserPayload {
    /// Length and format rules apply to what is stored, so trim first.
    pub fn trimmed(self) -> Self {
        Self {
            username: trim(self.username),
            email: trim(self.email),
            position: trim(self.position),
            phone: trim(self.phone),
            ..self
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[serde(alias = "Username")]
    #[validate(length(min = 3, max = 50, message = "Имя пользователя должно содержать от 3 до 50 символов"))]
    pub username: Option<String>,
    #[serde(alias = "Email")]
    #[validate(
        email(message = "Некорректный формат email"),
        length(max = 100, message = "Email не должен превышать 100 символов")
    )]
    pub email: Option<String>,
    #[serde(alias = "Role")]
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
    #[serde(alias = "Position")]
    pub position: Option<String>,
    #[serde(alias = "Phone")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(alias = "IsActive")]
    pub is_active: Option<bool>,
}

impl UpdateUserPayload {
    pub fn trimmed(self) -> Self {
        Self {
            username: trim(self.username),
            email: trim(self.email),
            position: trim(self.position),
            phone: trim(self.phone),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserResponse {
    pub success: bool,
    pub message: String,
    pub updated_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}
