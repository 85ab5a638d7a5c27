use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::password_policy::must_change_password;
use crate::utils::time::now;
use crate::AppState;

pub const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";

/// Session of the authenticated caller, loaded fresh from the database on
/// every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub must_change_password: bool,
}

impl CurrentUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role(),
            must_change_password: user.first_login
                || must_change_password(user.role(), user.last_password_change, now()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(&req)
        .ok_or_else(|| Error::Unauthorized("Не авторизован, нет токена".to_string()))?;

    let claims = state.auth_service.signer().verify(token)?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Не авторизован, неверный токен".to_string()))?;

    let user = state
        .auth_service
        .find_user(user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized("Пользователь не найден".to_string()))?;

    if !user.is_active {
        return Err(Error::Unauthorized(
            "Учетная запись пользователя отключена".to_string(),
        ));
    }

    let current = CurrentUser::from_user(&user);
    if state.enforce_password_change
        && current.must_change_password
        && is_mutating(req.method())
        && req.uri().path() != CHANGE_PASSWORD_PATH
    {
        tracing::warn!(user_id = current.id, path = %req.uri().path(), "blocked until password change");
        return Err(Error::Forbidden("Требуется смена пароля".to_string()));
    }

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

/// Must run after [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    let Some(current) = req.extensions().get::<CurrentUser>() else {
        return Err(Error::Unauthorized("Не авторизован, нет токена".to_string()));
    };
    if !current.is_admin() {
        return Err(Error::Forbidden(
            "Не авторизован как администратор".to_string(),
        ));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn bearer_token_is_extracted() {
        let req = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), Some("abc.def"));

        let req = Request::builder()
            .header(AUTHORIZATION, "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), None);

        let req = Request::builder()
            .header(AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn reads_are_not_mutating() {
        assert!(!is_mutating(&Method::GET));
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::DELETE));
    }
}
