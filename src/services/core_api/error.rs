use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;

use crate::services::core_api::signer::SignError;

/// COR-001 rejected the registration. `errors` maps form field → message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("spp member registration rejected ({} field errors)", .errors.len())]
pub struct SppMemberRegisterError {
    pub status: Option<String>,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum CoreApiError {
    #[error(transparent)]
    Signing(#[from] SignError),

    #[error("invalid core api url: {0}")]
    Url(#[from] url::ParseError),

    #[error("core api transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("did lookup (COR-112) rejected with status {status}")]
    DidLookupRejected { status: StatusCode, body: String },

    #[error(transparent)]
    Registration(#[from] SppMemberRegisterError),

    #[error("unexpected {endpoint} status {status}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("malformed {endpoint} response body: {source}")]
    MalformedBody {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response has no member details")]
    MissingMemberDetails { endpoint: &'static str },
}
