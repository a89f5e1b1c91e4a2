use std::collections::BTreeMap;

use serde::Deserialize;

pub const MEMBER_NAME_MAX_CHARS: usize = 255;

pub type FieldErrors = BTreeMap<String, String>;

/// Everything the `/Login` page can post. Which button was pressed decides
/// which form gets bound (`login` or `register`).
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageSubmission {
    pub login: Option<String>,
    pub register: Option<String>,

    pub member_name_or_email_addr: Option<String>,
    pub password: Option<String>,
    /// Correlation state forwarded by the calling service, if any.
    pub dspp: Option<String>,

    pub birthday_year: Option<String>,
    pub birthday_month: Option<String>,
    pub birthday_day: Option<String>,
}

#[derive(Clone, Default)]
pub struct LoginForm {
    pub member_name_or_email_addr: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("member_name_or_email_addr", &self.member_name_or_email_addr)
            .finish_non_exhaustive()
    }
}

impl LoginForm {
    pub fn from_submission(sub: &LoginPageSubmission) -> Self {
        Self {
            member_name_or_email_addr: sub.member_name_or_email_addr.clone().unwrap_or_default(),
            password: sub.password.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.member_name_or_email_addr.trim().is_empty() {
            errors.insert(
                "memberNameOrEmailAddr".to_string(),
                "may not be blank".to_string(),
            );
        } else if self.member_name_or_email_addr.chars().count() > MEMBER_NAME_MAX_CHARS {
            errors.insert(
                "memberNameOrEmailAddr".to_string(),
                format!("size must be between 0 and {MEMBER_NAME_MAX_CHARS}"),
            );
        }
        if self.password.trim().is_empty() {
            errors.insert("password".to_string(), "may not be blank".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, password: &str) -> LoginForm {
        LoginForm {
            member_name_or_email_addr: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_filled_form() {
        assert!(form("user@example.com", "hunter2").validate().is_ok());
    }

    #[test]
    fn blank_fields_are_reported_per_field() {
        let errors = form("  ", "").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("memberNameOrEmailAddr"));
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn member_name_is_limited_to_255_chars() {
        assert!(form(&"a".repeat(255), "pw").validate().is_ok());
        let errors = form(&"a".repeat(256), "pw").validate().unwrap_err();
        assert!(errors.contains_key("memberNameOrEmailAddr"));
    }

    #[test]
    fn debug_output_hides_password() {
        let out = format!("{:?}", form("user", "hunter2"));
        assert!(!out.contains("hunter2"));
    }
}
