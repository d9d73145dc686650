//! Account routes: registration, login, token refresh and profile management.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::extract::{optional_json, ApiJson};
use super::http_layers::with_login_rate_limit;
use super::metrics::record_login_attempt;
use super::session::Session;
use super::state::{GuardedUserManager, ServerState};
use super::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::user::{ProfileUpdate, Registration, User, UserRole, REFRESH_TOKEN_LIFETIME_DAYS};

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
    password_confirm: String,
    first_name: String,
    last_name: String,
    user_type: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RefreshBody {
    refresh: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProfileBody {
    username: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChangePasswordBody {
    current_password: String,
    new_password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    access: String,
    user: User,
}

#[derive(Serialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: User,
}

#[derive(Serialize)]
struct AccessResponse {
    access: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(MessageResponse {
            message: message.into(),
        })
    }
}

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(REFRESH_TOKEN_LIFETIME_DAYS))
        .build()
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    let role = match body.user_type.as_deref() {
        None | Some("") => UserRole::default(),
        Some(raw) => UserRole::from_str(raw).ok_or_else(|| {
            AppError::invalid_field("user_type", format!("\"{}\" is not a valid choice.", raw))
        })?,
    };
    let session = user_manager.register(Registration {
        username: body.username,
        email: body.email,
        password: body.password,
        password_confirm: body.password_confirm,
        first_name: body.first_name,
        last_name: body.last_name,
        role,
    })?;
    Ok((
        StatusCode::CREATED,
        jar.add(refresh_cookie(session.refresh)),
        Json(RegisterResponse {
            access: session.access,
            user: session.user,
        }),
    ))
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginBody>,
) -> AppResult<impl IntoResponse> {
    let start = Instant::now();
    let result = user_manager.login(body.email.trim(), &body.password);
    let status = match &result {
        Ok(_) => "success",
        Err(AppError::Internal(_)) => "error",
        Err(_) => "failure",
    };
    record_login_attempt(status, start.elapsed());

    let session = result?;
    info!("User {} logged in", session.user.id);
    Ok((
        jar.add(refresh_cookie(session.refresh.clone())),
        Json(LoginResponse {
            access: session.access,
            refresh: session.refresh,
            user: session.user,
        }),
    ))
}

async fn logout(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    user_manager.logout(&session.subject(), refresh.as_deref())?;
    Ok((
        jar.remove(Cookie::build(REFRESH_COOKIE).path("/")),
        MessageResponse::new("Successfully logged out"),
    ))
}

async fn refresh(
    State(user_manager): State<GuardedUserManager>,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<Json<AccessResponse>> {
    let body: RefreshBody = optional_json(&body)?;
    let token = body
        .refresh
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| {
            debug!("Refresh requested without a token");
            AppError::unauthorized("Refresh token not found")
        })?;
    let access = user_manager.refresh(&token)?;
    Ok(Json(AccessResponse { access }))
}

async fn get_profile(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
) -> AppResult<Json<User>> {
    Ok(Json(user_manager.get_profile(&session.subject())?))
}

async fn update_profile(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    ApiJson(body): ApiJson<ProfileBody>,
) -> AppResult<Json<User>> {
    let user = user_manager.update_profile(
        &session.subject(),
        ProfileUpdate {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
        },
    )?;
    Ok(Json(user))
}

async fn change_password(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    ApiJson(body): ApiJson<ChangePasswordBody>,
) -> AppResult<Json<MessageResponse>> {
    user_manager.change_password(
        &session.subject(),
        &body.current_password,
        &body.new_password,
    )?;
    Ok(MessageResponse::new("Password changed successfully"))
}

pub fn make_account_routes(config: &ServerConfig) -> anyhow::Result<Router<ServerState>> {
    let login_route = with_login_rate_limit(
        Router::new().route("/login", post(login)),
        config.login_requests_per_minute,
    )?;

    Ok(Router::new()
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route(
            "/profile",
            get(get_profile).put(update_profile).patch(update_profile),
        )
        .route("/change-password", post(change_password))
        .merge(login_route))
}
