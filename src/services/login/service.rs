use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::services::core_api::{
    AuthorizeResponse, CoreApi, CoreApiError, SppMemberDetails, SppMemberRegisterError,
};
use crate::services::login::redirect::{RedirectDecision, Unexpected, UnexpectedReason, interpret};

/// Per-request inputs of one login attempt. Nothing here outlives the request.
#[derive(Clone)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub secret: &'a str,
    pub user_agent: &'a str,
    pub correlation_state: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Upstream response to hand back to the browser as-is.
    Success(AuthorizeResponse),
    LoginRejected,
    AccountStateInvalid,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("unexpected login failure: {reason}")]
    Unexpected {
        reason: UnexpectedReason,
        location: Option<String>,
        #[source]
        source: Option<CoreApiError>,
    },

    #[error(transparent)]
    Registration(#[from] SppMemberRegisterError),
}

impl LoginError {
    pub fn reason(&self) -> Option<UnexpectedReason> {
        match self {
            LoginError::Unexpected { reason, .. } => Some(*reason),
            LoginError::Registration(_) => None,
        }
    }
}

impl From<Unexpected> for LoginError {
    fn from(u: Unexpected) -> Self {
        LoginError::Unexpected {
            reason: u.reason,
            location: u.location,
            source: None,
        }
    }
}

impl From<CoreApiError> for LoginError {
    fn from(e: CoreApiError) -> Self {
        let reason = match &e {
            CoreApiError::Registration(r) => return LoginError::Registration(r.clone()),
            CoreApiError::Signing(_) => UnexpectedReason::SigningFailed,
            CoreApiError::Url(_) | CoreApiError::Transport(_) => {
                UnexpectedReason::CoreApiUnreachable
            }
            CoreApiError::DidLookupRejected { .. } => UnexpectedReason::DidLookupRejected,
            CoreApiError::UnexpectedStatus { .. } => UnexpectedReason::UnexpectedStatus,
            CoreApiError::MalformedBody { .. } => UnexpectedReason::MalformedResponse,
            CoreApiError::MissingMemberDetails { .. } => UnexpectedReason::MissingMemberDetails,
        };
        LoginError::Unexpected {
            reason,
            location: None,
            source: Some(e),
        }
    }
}

/// Orchestrates COR-901 and, for DID identities, COR-112 + COR-001 + a second COR-901.
#[derive(Clone)]
pub struct LoginService {
    core: Arc<dyn CoreApi>,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService").finish_non_exhaustive()
    }
}

impl LoginService {
    pub fn new(core: Arc<dyn CoreApi>) -> Self {
        Self { core }
    }

    pub async fn login(&self, req: &LoginRequest<'_>) -> Result<LoginOutcome, LoginError> {
        let response = self
            .core
            .authorize(
                req.identifier,
                req.secret,
                req.user_agent,
                req.correlation_state,
            )
            .await?;

        match interpret(&response)? {
            RedirectDecision::LoginRejected => {
                info!("login rejected by core api");
                Ok(LoginOutcome::LoginRejected)
            }
            RedirectDecision::AccountStateInvalid => {
                info!(location = ?response.location, "account state needs remediation");
                Ok(LoginOutcome::AccountStateInvalid)
            }
            RedirectDecision::Proceed => Ok(LoginOutcome::Success(response)),
            RedirectDecision::DidRegistrationPending { did_token } => {
                debug!("did login detected, registering spp member");
                self.register_and_relogin(req, &did_token).await
            }
        }
    }

    /// Register the DID identity as an SPP member, then authorize again.
    /// The second answer is the final one.
    async fn register_and_relogin(
        &self,
        req: &LoginRequest<'_>,
        did_token: &str,
    ) -> Result<LoginOutcome, LoginError> {
        let did = self.core.get_did_information(did_token).await?;

        let registered = self
            .core
            .register_spp_member(SppMemberDetails::from(&did), true, true, Some(did_token))
            .await?;

        let identifier = registered
            .member_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(req.identifier);

        let response = self
            .core
            .authorize(
                identifier,
                req.secret,
                req.user_agent,
                req.correlation_state,
            )
            .await?;

        match interpret(&response)? {
            RedirectDecision::Proceed => Ok(LoginOutcome::Success(response)),
            RedirectDecision::LoginRejected => Ok(LoginOutcome::LoginRejected),
            RedirectDecision::AccountStateInvalid => Ok(LoginOutcome::AccountStateInvalid),
            RedirectDecision::DidRegistrationPending { .. } => {
                error!(location = ?response.location, "did login requested again after registration");
                Err(LoginError::Unexpected {
                    reason: UnexpectedReason::DidReloginLoop,
                    location: response.location,
                    source: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::core_api::CoreApiClient;
    use crate::services::core_api::client::tests::test_config;
    use crate::services::core_api::signer::tests::decode_request_object;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REQ: LoginRequest<'static> = LoginRequest {
        identifier: "user@example.com",
        secret: "hunter2",
        user_agent: "Mozilla/5.0 (test)",
        correlation_state: "st-1",
    };

    fn service(server: &MockServer) -> LoginService {
        let client = CoreApiClient::new(&test_config(&server.uri())).unwrap();
        LoginService::new(Arc::new(client))
    }

    fn callback(description: &str, did_token: Option<&str>) -> String {
        let mut url = url::Url::parse("https://login.example.com/callback").unwrap();
        url.query_pairs_mut()
            .append_pair("code", "c1")
            .append_pair("description", description);
        if let Some(t) = did_token {
            url.query_pairs_mut().append_pair("didToken", t);
        }
        url.to_string()
    }

    fn redirect(location: &str) -> ResponseTemplate {
        ResponseTemplate::new(302).insert_header("location", location)
    }

    fn request_object_member_name(req: &wiremock::Request) -> String {
        let token = req
            .url
            .query_pairs()
            .find(|(k, _)| k == "request")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        decode_request_object(&token).member_name
    }

    #[tokio::test]
    async fn plain_success_returns_original_response() {
        let server = MockServer::start().await;
        let location = callback(r#"{"login":"spp"}"#, None);

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&location).set_body_string("moved"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cor001"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = service(&server).login(&REQ).await.unwrap();

        assert_eq!(
            outcome,
            LoginOutcome::Success(AuthorizeResponse {
                status: StatusCode::FOUND,
                location: Some(location),
                body: "moved".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn did_login_registers_once_and_returns_relogin_result() {
        let server = MockServer::start().await;
        let first = callback(r#"{"login":"did"}"#, Some("did-tok"));
        let second = callback(r#"{"login":"spp"}"#, None);

        // First authorize answers "did", the re-login answers plain success.
        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&first))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&second))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor112"))
            .and(query_param("did_token", "did-tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "did_member_details": {"did_member_id": "d-1", "member_name": "minnie"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cor001"))
            .and(query_param("actual", "1"))
            .and(query_param("did_token", "did-tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "spp_member_details": {"member_name": "minnie"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = service(&server).login(&REQ).await.unwrap();

        match outcome {
            LoginOutcome::Success(res) => assert_eq!(res.location, Some(second)),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let authorize_calls: Vec<_> = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path() == "/cor901")
            .collect();
        assert_eq!(authorize_calls.len(), 2);
        assert_eq!(
            request_object_member_name(&authorize_calls[0]),
            "user@example.com"
        );
        assert_eq!(request_object_member_name(&authorize_calls[1]), "minnie");
    }

    #[tokio::test]
    async fn did_registration_failure_surfaces_field_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&callback(r#"{"login":"did"}"#, Some("did-tok"))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor112"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"did_member_details": {"did_member_id": "d-1"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cor001"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"status": "error", "error": {"email": "invalid"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server).login(&REQ).await.unwrap_err();

        match err {
            LoginError::Registration(e) => assert_eq!(
                e.errors,
                BTreeMap::from([("email".to_string(), "invalid".to_string())])
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeated_did_answer_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&callback(r#"{"login":"did"}"#, Some("did-tok"))))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor112"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"did_member_details": {"member_name": "minnie"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cor001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"status": "ok", "spp_member_details": {"member_name": "minnie"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server).login(&REQ).await.unwrap_err();
        assert_eq!(err.reason(), Some(UnexpectedReason::DidReloginLoop));
    }

    #[tokio::test]
    async fn client_error_without_error_code_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(ResponseTemplate::new(400).insert_header("location", "/cb?error=x"))
            .mount(&server)
            .await;

        let err = service(&server).login(&REQ).await.unwrap_err();
        assert_eq!(err.reason(), Some(UnexpectedReason::MissingErrorCode));
    }

    #[tokio::test]
    async fn client_error_without_location_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = service(&server).login(&REQ).await.unwrap_err();
        assert_eq!(err.reason(), Some(UnexpectedReason::MissingLocation));
    }

    #[tokio::test]
    async fn bad_credentials_and_account_state_are_distinguished() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("location", "/cb?error_description=failed_or_invalid"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("location", "/cb?error_description=account_suspended"),
            )
            .mount(&server)
            .await;

        let svc = service(&server);
        assert_eq!(svc.login(&REQ).await.unwrap(), LoginOutcome::LoginRejected);
        assert_eq!(
            svc.login(&REQ).await.unwrap(),
            LoginOutcome::AccountStateInvalid
        );
    }

    #[tokio::test]
    async fn did_lookup_rejection_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cor901"))
            .respond_with(redirect(&callback(r#"{"login":"did"}"#, Some("did-tok"))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cor112"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cor001"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = service(&server).login(&REQ).await.unwrap_err();
        assert_eq!(err.reason(), Some(UnexpectedReason::DidLookupRejected));
    }
}
