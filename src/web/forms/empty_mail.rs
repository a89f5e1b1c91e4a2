use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::web::forms::login::{FieldErrors, LoginPageSubmission};

pub const BIRTHDAY_START_YEAR: i32 = 1901;
pub const DEFAULT_BIRTHDAY_YEAR: &str = "1989";
pub const DEFAULT_BIRTHDAY_MONTH: &str = "1";
pub const DEFAULT_BIRTHDAY_DAY: &str = "1";

/// Selectable birthday years, oldest first.
pub fn birthday_years() -> Vec<i32> {
    (BIRTHDAY_START_YEAR..=Utc::now().year()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyMailForm {
    pub birthday_year: String,
    pub birthday_month: String,
    pub birthday_day: String,
}

impl Default for EmptyMailForm {
    fn default() -> Self {
        Self {
            birthday_year: DEFAULT_BIRTHDAY_YEAR.to_string(),
            birthday_month: DEFAULT_BIRTHDAY_MONTH.to_string(),
            birthday_day: DEFAULT_BIRTHDAY_DAY.to_string(),
        }
    }
}

impl EmptyMailForm {
    pub fn from_submission(sub: &LoginPageSubmission) -> Self {
        Self {
            birthday_year: sub.birthday_year.clone().unwrap_or_default(),
            birthday_month: sub.birthday_month.clone().unwrap_or_default(),
            birthday_day: sub.birthday_day.clone().unwrap_or_default(),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        let year = self.birthday_year.trim().parse::<i32>().ok()?;
        let month = self.birthday_month.trim().parse::<u32>().ok()?;
        let day = self.birthday_day.trim().parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.date() {
            None => {
                errors.insert("birthday".to_string(), "is not a valid date".to_string());
            }
            Some(d) if d.year() < BIRTHDAY_START_YEAR || d > Utc::now().date_naive() => {
                errors.insert("birthday".to_string(), "is out of range".to_string());
            }
            Some(_) => {}
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// `YYYY{sep}MM{sep}DD`, or `None` when the fields are not a real date.
    pub fn birthday(&self, sep: &str) -> Option<String> {
        self.date()
            .map(|d| format!("{:04}{sep}{:02}{sep}{:02}", d.year(), d.month(), d.day()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(y: &str, m: &str, d: &str) -> EmptyMailForm {
        EmptyMailForm {
            birthday_year: y.to_string(),
            birthday_month: m.to_string(),
            birthday_day: d.to_string(),
        }
    }

    #[test]
    fn defaults_are_a_valid_birthday() {
        let f = EmptyMailForm::default();
        assert!(f.validate().is_ok());
        assert_eq!(f.birthday("/").as_deref(), Some("1989/01/01"));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(form("2001", "2", "29").validate().is_err());
        assert!(form("1989", "13", "1").validate().is_err());
        assert!(form("", "1", "1").validate().is_err());
        assert_eq!(form("2001", "2", "29").birthday("/"), None);
    }

    #[test]
    fn years_outside_selectable_range_are_rejected() {
        assert!(form("1900", "12", "31").validate().is_err());
        assert!(form("1901", "1", "1").validate().is_ok());
        let next_year = (Utc::now().year() + 1).to_string();
        assert!(form(&next_year, "1", "1").validate().is_err());
    }

    #[test]
    fn year_list_starts_at_1901_and_ends_this_year() {
        let years = birthday_years();
        assert_eq!(years.first(), Some(&1901));
        assert_eq!(years.last(), Some(&Utc::now().year()));
    }
}
