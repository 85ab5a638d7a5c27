use sqlx::PgPool;

use crate::dto::auth_dto::{ChangePasswordPayload, LoginPayload, LoginResponse, MessageResponse, UserResponse};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::password_policy::PasswordPolicy;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::time::now;
use crate::utils::token::TokenSigner;

pub const USER_COLUMNS: &str = "id, username, email, password_hash, role, first_login, is_active, \
     position, phone, last_password_change, created_at";

const BAD_CREDENTIALS: &str = "Некорректные данные";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(pool: PgPool, signer: TokenSigner) -> Self {
        Self { pool, signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub async fn find_user(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse> {
        let (Some(username), Some(password)) = (
            payload.username.filter(|u| !u.is_empty()),
            payload.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(Error::BadRequest("Введите имя и пароль".to_string()));
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(&username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            tracing::warn!(username = %username, "login with unknown username");
            return Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !verify_password(&password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            tracing::warn!(user_id = user.id, "login attempt on disabled account");
            return Err(Error::Unauthorized(
                "Учетная запись пользователя отключена".to_string(),
            ));
        }

        let token = self
            .signer
            .issue(user.id, &user.role, &user.username, user.first_login)?;

        tracing::info!(user_id = user.id, role = %user.role, "user logged in");

        Ok(LoginResponse {
            token,
            user: UserResponse::from_user(&user, now()),
        })
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        payload: ChangePasswordPayload,
    ) -> Result<MessageResponse> {
        let (Some(current), Some(new)) = (
            payload.current_password.filter(|p| !p.is_empty()),
            payload.new_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(Error::BadRequest(
                "Требуется текущий и новый пароль.".to_string(),
            ));
        };

        if current == new {
            return Err(Error::BadRequest(
                "Новый пароль должен отличаться от старого".to_string(),
            ));
        }

        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Пользователь не найден".to_string()))?;

        if !verify_password(&current, &user.password_hash) {
            return Err(Error::BadRequest("Текущий пароль неверный".to_string()));
        }

        PasswordPolicy::for_role(user.role()).check(&new)?;

        let hashed = hash_password(&new)?;
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                first_login = FALSE,
                last_password_change = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(hashed)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = user.id, "password changed");

        Ok(MessageResponse::new("Пароль успешно изменен"))
    }

    pub async fn me(&self, user_id: i32) -> Result<UserResponse> {
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Пользователь не найден".to_string()))?;
        Ok(UserResponse::from_user(&user, now()))
    }
}
