//! Decodes the COR-901 redirect channel.
//!
//! One `Location` header carries three different situations: bad
//! credentials, an account that needs remediation, and a DID identity that has
//! to be registered before it can log in. Anything this module does not
//! recognise is `Unexpected`, never success.
use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use crate::services::core_api::AuthorizeResponse;

/// `error_description` codes meaning "member name or password is wrong".
const LOGIN_REJECTED_CODES: &[&str] = &["failed_or_invalid", "unauthorized"];

/// `error_description` codes meaning "the account exists but needs attention".
const ACCOUNT_STATE_CODES: &[&str] = &[
    "account_locked",
    "account_suspended",
    "account_withdrawn",
    "member_not_activated",
    "password_expired",
    "guardian_consent_required",
];

const DID_LOGIN_TYPE: &str = "did";

/// Short machine-readable reason attached to every unexpected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedReason {
    MissingLocation,
    InvalidLocation,
    MissingErrorCode,
    UnknownErrorCode,
    MissingDescription,
    MalformedDescription,
    MissingLoginType,
    MissingDidToken,
    DidReloginLoop,
    SigningFailed,
    CoreApiUnreachable,
    DidLookupRejected,
    UnexpectedStatus,
    MalformedResponse,
    MissingMemberDetails,
}

impl UnexpectedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingLocation => "missing_location",
            Self::InvalidLocation => "invalid_location",
            Self::MissingErrorCode => "missing_error_code",
            Self::UnknownErrorCode => "unknown_error_code",
            Self::MissingDescription => "missing_description",
            Self::MalformedDescription => "malformed_description",
            Self::MissingLoginType => "missing_login_type",
            Self::MissingDidToken => "missing_did_token",
            Self::DidReloginLoop => "did_relogin_loop",
            Self::SigningFailed => "signing_failed",
            Self::CoreApiUnreachable => "core_api_unreachable",
            Self::DidLookupRejected => "did_lookup_rejected",
            Self::UnexpectedStatus => "unexpected_status",
            Self::MalformedResponse => "malformed_response",
            Self::MissingMemberDetails => "missing_member_details",
        }
    }
}

impl fmt::Display for UnexpectedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outcome the interpreter refuses to guess about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unexpected {
    pub reason: UnexpectedReason,
    pub location: Option<String>,
}

impl Unexpected {
    fn new(reason: UnexpectedReason, location: Option<&str>) -> Self {
        Self {
            reason,
            location: location.map(str::to_string),
        }
    }
}

/// Coarse shape of a COR-901 answer before any code is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    Success {
        location: Option<String>,
        body: String,
    },
    ClientError {
        location: Option<String>,
        error_code: Option<String>,
    },
    Malformed,
}

impl AuthorizeOutcome {
    pub fn from_response(response: &AuthorizeResponse) -> Self {
        if !response.status.is_client_error() {
            return Self::Success {
                location: response.location.clone(),
                body: response.body.clone(),
            };
        }

        let error_code = response
            .location
            .as_deref()
            .and_then(|l| RedirectDescription::parse(l).ok())
            .and_then(|d| d.get("error_description").map(str::to_string));

        if response.location.is_none() && error_code.is_none() {
            return Self::Malformed;
        }

        Self::ClientError {
            location: response.location.clone(),
            error_code,
        }
    }
}

/// What the login flow has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Bad credentials. Show the form again.
    LoginRejected,
    /// Account needs remediation. Send the user to the status page.
    AccountStateInvalid,
    /// DID identity. Register it, then log in again.
    DidRegistrationPending { did_token: String },
    /// Plain success. Hand the upstream response back unchanged.
    Proceed,
}

/// Decoded query of a redirect target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectDescription {
    params: HashMap<String, String>,
}

impl RedirectDescription {
    /// Accepts absolute URLs and relative redirect targets (`/cb?x=1`).
    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://localhost/")?;
                base.join(location)?
            }
            Err(e) => return Err(e),
        };

        // The first occurrence of a key wins.
        let mut params = HashMap::new();
        for (k, v) in url.query_pairs() {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }

        Ok(Self { params })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// URL-decoded `description` parameter as a JSON object.
    pub fn description(&self) -> Result<Option<Map<String, Value>>, serde_json::Error> {
        self.get("description")
            .map(serde_json::from_str::<Map<String, Value>>)
            .transpose()
    }
}

/// Classify a raw COR-901 answer.
pub fn interpret(response: &AuthorizeResponse) -> Result<RedirectDecision, Unexpected> {
    match AuthorizeOutcome::from_response(response) {
        AuthorizeOutcome::Malformed => Err(Unexpected::new(UnexpectedReason::MissingLocation, None)),
        AuthorizeOutcome::ClientError {
            location,
            error_code: None,
        } => Err(Unexpected {
            reason: UnexpectedReason::MissingErrorCode,
            location,
        }),
        AuthorizeOutcome::ClientError {
            location,
            error_code: Some(code),
        } => classify_error_code(&code, location),
        AuthorizeOutcome::Success { location, .. } => interpret_success(location.as_deref()),
    }
}

fn classify_error_code(
    code: &str,
    location: Option<String>,
) -> Result<RedirectDecision, Unexpected> {
    if LOGIN_REJECTED_CODES.contains(&code) {
        Ok(RedirectDecision::LoginRejected)
    } else if ACCOUNT_STATE_CODES.contains(&code) {
        Ok(RedirectDecision::AccountStateInvalid)
    } else {
        Err(Unexpected {
            reason: UnexpectedReason::UnknownErrorCode,
            location,
        })
    }
}

fn interpret_success(location: Option<&str>) -> Result<RedirectDecision, Unexpected> {
    let Some(raw) = location else {
        return Err(Unexpected::new(UnexpectedReason::MissingLocation, None));
    };

    let redirect = RedirectDescription::parse(raw)
        .map_err(|_| Unexpected::new(UnexpectedReason::InvalidLocation, location))?;

    let description = redirect
        .description()
        .map_err(|_| Unexpected::new(UnexpectedReason::MalformedDescription, location))?
        .ok_or_else(|| Unexpected::new(UnexpectedReason::MissingDescription, location))?;

    let login_type = match description.get("login") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Null) | None => {
            return Err(Unexpected::new(UnexpectedReason::MissingLoginType, location));
        }
        Some(_) => {
            return Err(Unexpected::new(
                UnexpectedReason::MalformedDescription,
                location,
            ));
        }
    };

    if login_type != DID_LOGIN_TYPE {
        return Ok(RedirectDecision::Proceed);
    }

    let did_token = redirect
        .get("didToken")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Unexpected::new(UnexpectedReason::MissingDidToken, location))?;

    Ok(RedirectDecision::DidRegistrationPending {
        did_token: did_token.to_string(),
    })
}
