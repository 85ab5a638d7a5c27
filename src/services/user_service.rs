use sqlx::{PgPool, Postgres, Transaction};
use validator::{ValidationError, ValidationErrors};

use crate::dto::auth_dto::UserResponse;
use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UpdateUserResponse};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::auth_service::USER_COLUMNS;
use crate::services::password_policy::PasswordPolicy;
use crate::utils::crypto::hash_password;
use crate::utils::time::now;
use crate::utils::validation::validate;

fn field_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("conflict");
    err.message = Some(message.into());
    err
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let now = now();
        Ok(users.iter().map(|u| UserResponse::from_user(u, now)).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Пользователь не найден".to_string()))
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse> {
        let payload = payload.trimmed();
        validate(&payload)?;

        let CreateUserPayload {
            username: Some(username),
            email: Some(email),
            password: Some(password),
            role: Some(role),
            position: Some(position),
            phone: Some(phone),
        } = payload
        else {
            return Err(Error::BadRequest("Обязательные поля не заполнены".to_string()));
        };
        let role: Role = role
            .parse()
            .map_err(|_| Error::BadRequest("Неверная роль пользователя".to_string()))?;

        PasswordPolicy::for_role(role).check(&password)?;

        let mut tx = self.pool.begin().await?;

        if !position_exists(&mut tx, &position).await? {
            return Err(Error::BadRequest(
                "Должность не найдена в справочнике".to_string(),
            ));
        }
        if exists(&mut tx, "username", &username, None).await? {
            return Err(Error::BadRequest("Имя пользователя уже существует".to_string()));
        }
        if exists(&mut tx, "email", &email, None).await? {
            return Err(Error::BadRequest("Email уже существует".to_string()));
        }

        let hashed = hash_password(&password)?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, first_login, is_active, position, phone, last_password_change)
            VALUES ($1, $2, $3, $4, TRUE, TRUE, $5, $6, NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&username)
        .bind(&email)
        .bind(hashed)
        .bind(role.as_str())
        .bind(&position)
        .bind(&phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "user created");
        Ok(UserResponse::from_user(&user, now()))
    }

    /// Applies only the fields that differ from the stored row. Uniqueness
    /// and catalog checks run in the same transaction as the write.
    pub async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<UpdateUserResponse> {
        let payload = payload.trimmed();
        validate(&payload)?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Пользователь не найден".to_string()))?;

        let mut errors = ValidationErrors::new();
        let mut updated_fields = Vec::new();

        let username = match payload.username {
            Some(u) if u != current.username => {
                if exists(&mut tx, "username", &u, Some(id)).await? {
                    errors.add("username", field_error("Имя пользователя уже занято"));
                    None
                } else {
                    updated_fields.push("username".to_string());
                    Some(u)
                }
            }
            _ => None,
        };

        let email = match payload.email {
            Some(e) if e != current.email => {
                if exists(&mut tx, "email", &e, Some(id)).await? {
                    errors.add("email", field_error("Email уже используется"));
                    None
                } else {
                    updated_fields.push("email".to_string());
                    Some(e)
                }
            }
            _ => None,
        };

        let role = payload.role.filter(|r| *r != current.role);
        if role.is_some() {
            updated_fields.push("role".to_string());
        }

        let position = match payload.position {
            Some(p) => {
                if !position_exists(&mut tx, &p).await? {
                    errors.add("position", field_error("Должность не найдена в справочнике"));
                    None
                } else if current.position.as_deref() != Some(p.as_str()) {
                    updated_fields.push("position".to_string());
                    Some(p)
                } else {
                    None
                }
            }
            None => None,
        };

        let phone = payload
            .phone
            .filter(|p| current.phone.as_deref() != Some(p.as_str()));
        if phone.is_some() {
            updated_fields.push("phone".to_string());
        }

        let is_active = payload.is_active.filter(|a| *a != current.is_active);
        if is_active.is_some() {
            updated_fields.push("isActive".to_string());
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        if updated_fields.is_empty() {
            return Ok(UpdateUserResponse {
                success: true,
                message: "Изменений не обнаружено".to_string(),
                updated_fields,
                user: None,
            });
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                position = COALESCE($5, position),
                phone = COALESCE($6, phone),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(role)
        .bind(position)
        .bind(phone)
        .bind(is_active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = id, fields = ?updated_fields, "user updated");
        Ok(UpdateUserResponse {
            success: true,
            message: "Данные пользователя успешно обновлены".to_string(),
            updated_fields,
            user: Some(UserResponse::from_user(&user, now())),
        })
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Пользователь не найден".to_string()));
        }
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }
}

async fn position_exists(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<bool> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM positions WHERE LOWER(name) = LOWER($1) LIMIT 1")
            .bind(name.trim())
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.is_some())
}

/// `column` is one of the fixed identifiers above, never user input.
async fn exists(
    tx: &mut Transaction<'_, Postgres>,
    column: &'static str,
    value: &str,
    except_id: Option<i32>,
) -> Result<bool> {
    let row: Option<(i32,)> = sqlx::query_as(&format!(
        "SELECT id FROM users WHERE {} = $1 AND ($2::INT IS NULL OR id <> $2) LIMIT 1",
        column
    ))
    .bind(value)
    .bind(except_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.is_some())
}
