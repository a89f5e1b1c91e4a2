use async_trait::async_trait;
use reqwest::{StatusCode, header};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

use crate::config::{AuthorizeConfig, CoreApiConfig};
use crate::services::core_api::error::{CoreApiError, SppMemberRegisterError};
use crate::services::core_api::signer::{AuthorizeClaims, RequestSigner};
use crate::services::core_api::types::{
    Cor001ErrorResponse, Cor001Request, Cor001Response, Cor112Response, DidMemberDetails,
    SppMemberDetails, SppMemberRegister,
};

const COR_901: &str = "COR-901";
const COR_112: &str = "COR-112";
const COR_001: &str = "COR-001";

/// Raw COR-901 answer. Redirects are captured, not followed, so `location`
/// carries either the session continuation or the encoded error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Outbound calls to the Core API. Every call is a single attempt.
#[async_trait]
pub trait CoreApi: Send + Sync {
    async fn authorize(
        &self,
        identifier: &str,
        secret: &str,
        user_agent: &str,
        correlation_state: &str,
    ) -> Result<AuthorizeResponse, CoreApiError>;

    async fn get_did_information(&self, did_token: &str) -> Result<DidMemberDetails, CoreApiError>;

    async fn register_spp_member_with(
        &self,
        register: &SppMemberRegister,
        actual: bool,
        did_token: Option<&str>,
    ) -> Result<SppMemberDetails, CoreApiError>;

    async fn register_spp_member(
        &self,
        member_details: SppMemberDetails,
        actual: bool,
        is_fresh_for_did: bool,
        did_token: Option<&str>,
    ) -> Result<SppMemberDetails, CoreApiError> {
        let register = SppMemberRegister {
            is_fresh_for_did: Some(is_fresh_for_did),
            spp_member_details: member_details,
            ..Default::default()
        };
        self.register_spp_member_with(&register, actual, did_token)
            .await
    }
}

#[derive(Clone)]
pub struct CoreApiClient {
    http: reqwest::Client,
    base_url: Url,
    authorize: AuthorizeConfig,
    did_lookup_path: String,
    member_register_path: String,
    signer: Arc<RequestSigner>,
}

impl std::fmt::Debug for CoreApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.authorize.client_id)
            .field("signer", &self.signer)
            .finish()
    }
}

impl CoreApiClient {
    pub fn new(config: &CoreApiConfig) -> Result<Self, CoreApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let mut base_url = Url::parse(&config.base_url)?;
        if config.port.is_some() {
            base_url
                .set_port(config.port)
                .map_err(|_| CoreApiError::Url(url::ParseError::InvalidPort))?;
        }

        Ok(Self {
            http,
            base_url,
            authorize: config.authorize.clone(),
            did_lookup_path: config.did_lookup_path.clone(),
            member_register_path: config.member_register_path.clone(),
            signer: Arc::new(RequestSigner::from_config(&config.signing_key)?),
        })
    }

    /// `{base}{path}` where `path` is appended to whatever path the base carries.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    fn authorize_url(&self, correlation_state: &str, request_object: &str) -> Url {
        let mut url = self.endpoint(&self.authorize.path);
        url.query_pairs_mut()
            .append_pair("response_type", &self.authorize.response_type)
            .append_pair("client_id", &self.authorize.client_id)
            .append_pair("redirect_uri", &self.authorize.redirect_url)
            .append_pair("scope", &self.authorize.scope)
            .append_pair("state", correlation_state)
            .append_pair("nonce", &self.authorize.nonce)
            .append_pair("request", request_object);
        url
    }
}

#[async_trait]
impl CoreApi for CoreApiClient {
    async fn authorize(
        &self,
        identifier: &str,
        secret: &str,
        user_agent: &str,
        correlation_state: &str,
    ) -> Result<AuthorizeResponse, CoreApiError> {
        let claims = AuthorizeClaims {
            member_name: identifier.to_string(),
            password: secret.to_string(),
            client_id: self.authorize.client_id.clone(),
            nonce: self.authorize.nonce.clone(),
        };
        let request_object = self.signer.sign(&claims)?;

        let url = self.authorize_url(correlation_state, &request_object);
        // The query carries the signed credentials; only the path is logged.
        debug!(endpoint = COR_901, path = url.path(), "calling core api");

        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(endpoint = COR_901, %status, location = ?location, "core api responded");

        Ok(AuthorizeResponse {
            status,
            location,
            body,
        })
    }

    async fn get_did_information(&self, did_token: &str) -> Result<DidMemberDetails, CoreApiError> {
        let mut url = self.endpoint(&self.did_lookup_path);
        url.query_pairs_mut().append_pair("did_token", did_token);
        debug!(endpoint = COR_112, path = url.path(), "calling core api");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(endpoint = COR_112, %status, "core api responded");

        if status.is_client_error() {
            error!(endpoint = COR_112, %status, body = %body, "did lookup rejected");
            return Err(CoreApiError::DidLookupRejected { status, body });
        }
        if !status.is_success() {
            error!(endpoint = COR_112, %status, body = %body, "unexpected did lookup status");
            return Err(CoreApiError::UnexpectedStatus {
                endpoint: COR_112,
                status,
                body,
            });
        }

        let parsed: Cor112Response =
            serde_json::from_str(&body).map_err(|source| CoreApiError::MalformedBody {
                endpoint: COR_112,
                source,
            })?;

        parsed
            .did_member_details
            .ok_or(CoreApiError::MissingMemberDetails { endpoint: COR_112 })
    }

    async fn register_spp_member_with(
        &self,
        register: &SppMemberRegister,
        actual: bool,
        did_token: Option<&str>,
    ) -> Result<SppMemberDetails, CoreApiError> {
        let mut url = self.endpoint(&self.member_register_path);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("actual", if actual { "1" } else { "0" });
            if let Some(did_token) = did_token {
                query.append_pair("did_token", did_token);
            }
        }
        debug!(endpoint = COR_001, path = url.path(), actual, "calling core api");

        let response = self
            .http
            .post(url)
            .json(&Cor001Request {
                spp_member_register: register,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(endpoint = COR_001, %status, "core api responded");

        if status.is_client_error() {
            error!(endpoint = COR_001, %status, body = %body, "spp member registration rejected");
            let parsed: Cor001ErrorResponse =
                serde_json::from_str(&body).map_err(|source| CoreApiError::MalformedBody {
                    endpoint: COR_001,
                    source,
                })?;
            return Err(SppMemberRegisterError {
                status: parsed.status,
                errors: parsed.error,
            }
            .into());
        }
        if !status.is_success() {
            error!(endpoint = COR_001, %status, body = %body, "unexpected registration status");
            return Err(CoreApiError::UnexpectedStatus {
                endpoint: COR_001,
                status,
                body,
            });
        }

        let parsed: Cor001Response =
            serde_json::from_str(&body).map_err(|source| CoreApiError::MalformedBody {
                endpoint: COR_001,
                source,
            })?;
        debug!(endpoint = COR_001, status = ?parsed.status, "spp member registered");

        parsed
            .spp_member_details
            .ok_or(CoreApiError::MissingMemberDetails { endpoint: COR_001 })
    }
}
