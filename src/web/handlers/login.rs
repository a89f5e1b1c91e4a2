/*
 * Responsibility
 * - GET /Login (ログイン／新規登録ページ)
 * - POST /Login
 *   - `login` ボタン: LoginForm validation → login workflow → 結果を view / redirect に変換
 *   - `register` ボタン: EmptyMailForm validation → guest record 保存 → /Login/emptymail
 */
use axum::{
    Form,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    error::AppError,
    services::{
        core_api::AuthorizeResponse,
        guest::GuestRegistrationRecord,
        login::{LoginError, LoginOutcome, LoginRequest, UnexpectedReason},
        random,
    },
    state::AppState,
    web::{
        coop,
        extractors::{RequestCtx, RequestCtxExtractor},
        forms::{EmptyMailForm, LoginForm, LoginPageSubmission, empty_mail::birthday_years},
        view::View,
    },
};

pub const ACCOUNT_STATUS_PATH: &str = "/OneidStatus";
pub const EMPTY_MAIL_PATH: &str = "/Login/emptymail";

fn login_view(member_name: &str, empty_mail: &EmptyMailForm) -> View {
    // The password is never echoed back.
    View::new("login/login")
        .with("birthdayYears", birthday_years())
        .with("loginForm", json!({ "memberNameOrEmailAddr": member_name }))
        .with("emptyMailForm", empty_mail)
}

pub async fn login_page() -> View {
    login_view("", &EmptyMailForm::default())
}

pub async fn submit(
    State(state): State<AppState>,
    RequestCtxExtractor(ctx): RequestCtxExtractor,
    jar: CookieJar,
    Form(sub): Form<LoginPageSubmission>,
) -> Result<Response, AppError> {
    if sub.login.is_some() {
        member_login(&state, &ctx, &sub).await
    } else if sub.register.is_some() {
        first_time_of_use(&state, jar, &sub).await
    } else {
        Err(AppError::bad_request(
            "UNKNOWN_ACTION",
            "either login or register is required",
        ))
    }
}

async fn member_login(
    state: &AppState,
    ctx: &RequestCtx,
    sub: &LoginPageSubmission,
) -> Result<Response, AppError> {
    let form = LoginForm::from_submission(sub);
    let view = login_view(&form.member_name_or_email_addr, &EmptyMailForm::default());

    if let Err(errors) = form.validate() {
        return Ok(view
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .with("hasErrorForLogin", true)
            .with("errors", errors)
            .into_response());
    }

    let correlation_state = match sub.dspp.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => random::url_safe_token()?,
    };

    let req = LoginRequest {
        identifier: &form.member_name_or_email_addr,
        secret: &form.password,
        user_agent: &ctx.user_agent,
        correlation_state: &correlation_state,
    };

    match state.login.login(&req).await {
        Ok(LoginOutcome::Success(res)) => pass_through(res),
        Ok(LoginOutcome::LoginRejected) => Ok(view
            .status(StatusCode::UNAUTHORIZED)
            .with("apiLoginFailed", true)
            .into_response()),
        Ok(LoginOutcome::AccountStateInvalid) => {
            Ok(Redirect::to(ACCOUNT_STATUS_PATH).into_response())
        }
        Err(LoginError::Registration(e)) => Ok(view
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .with("hasErrorForLogin", true)
            .with("registrationErrors", e.errors)
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Hand the Core API answer to the browser: same status, `Location` and body.
fn pass_through(res: AuthorizeResponse) -> Result<Response, AppError> {
    let mut response = (res.status, res.body).into_response();

    if let Some(location) = res.location {
        let value = HeaderValue::from_str(&location).map_err(|_| {
            tracing::error!(location = %location, "location is not a valid header value");
            AppError::Unexpected {
                reason: UnexpectedReason::InvalidLocation,
            }
        })?;
        response.headers_mut().insert(header::LOCATION, value);
    }

    Ok(response)
}

async fn first_time_of_use(
    state: &AppState,
    jar: CookieJar,
    sub: &LoginPageSubmission,
) -> Result<Response, AppError> {
    let form = EmptyMailForm::from_submission(sub);

    let birthday = match (form.validate(), form.birthday("/")) {
        (Ok(()), Some(birthday)) => birthday,
        (Err(errors), _) => {
            return Ok(login_view("", &form)
                .status(StatusCode::UNPROCESSABLE_ENTITY)
                .with("hasErrorForRegister", true)
                .with("errors", errors)
                .into_response());
        }
        (Ok(()), None) => return Err(AppError::Internal),
    };

    let (jar, coop_key) = coop::ensure_coop_key(jar, state.secure_cookies)?;
    state
        .guests
        .put(
            &coop_key,
            &GuestRegistrationRecord::with_birthday(birthday),
            state.empty_mail.coop_key_ttl,
        )
        .await?;

    Ok((jar, Redirect::to(EMPTY_MAIL_PATH)).into_response())
}
