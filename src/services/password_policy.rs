use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::user::Role;

const SYMBOLS: &[char] = &['!', '$', '#', '%'];

pub const ADMIN_MIN_LENGTH: usize = 14;
pub const USER_MIN_LENGTH: usize = 9;

pub const ADMIN_MAX_AGE_DAYS: i64 = 180;
pub const USER_MAX_AGE_DAYS: i64 = 365;

/// Complexity rules for a new password, chosen by the owner's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn for_role(role: Role) -> Self {
        let min_length = match role {
            Role::Admin => ADMIN_MIN_LENGTH,
            Role::User => USER_MIN_LENGTH,
        };
        Self { min_length }
    }

    /// First rule the password breaks, if any.
    pub fn violation(&self, password: &str) -> Option<&'static str> {
        if password.chars().count() < self.min_length {
            return Some("слишком короткий");
        }
        if password
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && !SYMBOLS.contains(&c))
        {
            return Some("недопустимые символы");
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Some("нет строчной буквы");
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Some("нет заглавной буквы");
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Some("нет цифры");
        }
        if !password.chars().any(|c| SYMBOLS.contains(&c)) {
            return Some("нет символа !$#%");
        }
        None
    }

    pub fn check(&self, password: &str) -> Result<()> {
        match self.violation(password) {
            None => Ok(()),
            Some(rule) => Err(Error::BadRequest(format!(
                "Пароль не соответствует требованиям: {}. Длина: не менее {} символов, большие и маленькие латинские буквы, цифры и символы !$#%",
                rule, self.min_length
            ))),
        }
    }
}

/// Whole days since the last change, compared against the role's maximum
/// age. A password that was never changed always has to be.
pub fn must_change_password(role: Role, last_change: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    let Some(last_change) = last_change else {
        return true;
    };
    let max_age = match role {
        Role::Admin => ADMIN_MAX_AGE_DAYS,
        Role::User => USER_MAX_AGE_DAYS,
    };
    (now - last_change).num_days() >= max_age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn boundary_lengths_are_accepted() {
        assert_ok!(PasswordPolicy::for_role(Role::Admin).check("Abcdefghij12!$"));
        assert_ok!(PasswordPolicy::for_role(Role::User).check("Abcdef12#"));
    }

    #[test]
    fn one_short_is_rejected() {
        assert_err!(PasswordPolicy::for_role(Role::Admin).check("Abcdefghij12!"));
        assert_err!(PasswordPolicy::for_role(Role::User).check("Abcde12#"));
    }

    #[test]
    fn every_class_is_required() {
        let policy = PasswordPolicy::for_role(Role::User);
        assert_eq!(policy.violation("abcdefg1!"), Some("нет заглавной буквы"));
        assert_eq!(policy.violation("ABCDEFG1!"), Some("нет строчной буквы"));
        assert_eq!(policy.violation("Abcdefgh!"), Some("нет цифры"));
        assert_eq!(policy.violation("Abcdefgh1"), Some("нет символа !$#%"));
        assert_eq!(policy.violation("Abcdefg1!&"), Some("недопустимые символы"));
        assert_eq!(policy.violation("Пароль12!Ab"), Some("недопустимые символы"));
    }

    #[test]
    fn message_names_rule_and_length() {
        match PasswordPolicy::for_role(Role::Admin).check("Abc1!") {
            Err(Error::BadRequest(msg)) => {
                assert!(msg.contains("слишком короткий"));
                assert!(msg.contains("не менее 14 символов"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn expiry_thresholds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert!(must_change_password(Role::Admin, Some(now - Duration::days(180)), now));
        assert!(!must_change_password(Role::Admin, Some(now - Duration::days(179)), now));
        assert!(must_change_password(Role::User, Some(now - Duration::days(365)), now));
        assert!(!must_change_password(Role::User, Some(now - Duration::days(364)), now));
    }

    #[test]
    fn partial_days_do_not_count() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let last = now - Duration::days(180) + Duration::hours(1);
        assert!(!must_change_password(Role::Admin, Some(last), now));
    }

    #[test]
    fn never_changed_must_change() {
        assert!(must_change_password(Role::User, None, Utc::now()));
    }
}
