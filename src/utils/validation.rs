use std::borrow::Cow;

use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::models::user::Role;

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate().map_err(Error::from)
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// `+375 xx xxx xx xx`, each separating space optional.
pub fn is_belarus_phone(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("+375") else {
        return false;
    };
    let mut chars = rest.chars().peekable();
    for group in [2usize, 3, 2, 2] {
        if chars.peek() == Some(&' ') {
            chars.next();
        }
        for _ in 0..group {
            match chars.next() {
                Some(c) if c.is_ascii_digit() => {}
                _ => return false,
            }
        }
    }
    chars.next().is_none()
}

/// Loose contact phone used on access records: 6 to 20 of `0-9 + - ( )` and space.
pub fn is_contact_phone(value: &str) -> bool {
    let len = value.chars().count();
    (6..=20).contains(&len)
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

pub fn validate_phone(value: &str) -> std::result::Result<(), ValidationError> {
    if is_belarus_phone(value) {
        Ok(())
    } else {
        Err(error(
            "phone",
            "Телефон должен быть в формате +375 xx xxx xx xx",
        ))
    }
}

pub fn validate_role(value: &str) -> std::result::Result<(), ValidationError> {
    if value.parse::<Role>().is_ok() {
        Ok(())
    } else {
        Err(error("role", "Неверная роль пользователя"))
    }
}

pub fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Поле не может быть пустым"))
    } else {
        Ok(())
    }
}

/// Trimmed value, or `None` when the input is absent or whitespace only.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn belarus_phone_formats() {
        assert!(is_belarus_phone("+375 29 123 45 67"));
        assert!(is_belarus_phone("+375291234567"));
        assert!(is_belarus_phone("+375 29 1234567"));
        assert!(!is_belarus_phone("+375 29 123 45 6"));
        assert!(!is_belarus_phone("+375 29 123 45 678"));
        assert!(!is_belarus_phone("375 29 123 45 67"));
        assert!(!is_belarus_phone("+375  29 123 45 67"));
        assert!(!is_belarus_phone("+7 29 123 45 67"));
    }

    #[test]
    fn contact_phone_is_loose() {
        assert!(is_contact_phone("+7 (495) 123-45-67"));
        assert!(!is_contact_phone("12345"));
        assert!(!is_contact_phone("call me"));
    }

    #[test]
    fn role_must_be_known() {
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("user").is_ok());
        assert!(validate_role("root").is_err());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  Куратор ".into())), Some("Куратор".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
