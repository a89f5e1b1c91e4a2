use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a registration that is waiting for the empty-mail confirmation.
///
/// The cache owns the stored copy; the request-side value is dropped once it
/// has been written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRegistrationRecord {
    /// `YYYY/MM/DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,

    /// Filled in by the mail receiver once the empty mail arrives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl GuestRegistrationRecord {
    pub fn with_birthday(birthday: impl Into<String>) -> Self {
        Self {
            birthday: Some(birthday.into()),
            email_address: None,
            started_at: Some(Utc::now()),
        }
    }
}
