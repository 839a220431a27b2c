//! Account and session API endpoints.
//!
//! - POST `/register` - Create a local account and issue a session
//! - POST `/login` - Verify credentials and issue a session
//! - GET  `/` - Return the authenticated user's profile
//! - POST `/logout` - Clear both session cookies
//! - POST `/refresh` - Exchange the refresh token for a new access token
//! - POST `/external` - Log in via an external identity assertion
//! - PATCH `/update` - Update name/email
//! - PATCH `/password` - Change password

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::error::{ApiError, ResultExt};
use crate::auth::{
    Auth, CookieSettings, ExternalAssertionVerifier, REFRESH_COOKIE_NAME, clear_session,
    get_cookie, issue_session, refresh_access_cookie,
};
use crate::db::{Database, Provider, User};
use crate::impl_has_auth_state;
use crate::jwt::{JwtConfig, TokenPurpose};

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookieSettings,
    pub verifier: Option<Arc<dyn ExternalAssertionVerifier>>,
}

impl_has_auth_state!(AuthState);

pub fn router(state: AuthState) -> Router {
    let router = Router::new()
        .route("/", get(get_user))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/update", patch(update_profile))
        .route("/password", patch(change_password));

    // External login is only reachable when a verifier is configured
    let router = if state.verifier.is_some() {
        router.route("/external", post(external_login))
    } else {
        router
    };

    router.with_state(state)
}

/// Non-sensitive identity fields returned to clients.
/// Credential material never appears here.
#[derive(Serialize)]
struct UserProfile {
    id: String,
    name: String,
    email: String,
    provider: Provider,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.uuid.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            provider: user.provider,
        }
    }
}

#[derive(Serialize)]
struct SessionResponse {
    success: bool,
    user: UserProfile,
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    let taken = state
        .db
        .users()
        .email_taken(email)
        .await
        .db_err("Failed to check email availability")?;
    if taken {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to create account")
    })?;

    let uuid = uuid::Uuid::new_v4().to_string();
    state
        .db
        .users()
        .create(&uuid, name, email, Some(&password_hash), Provider::Local)
        .await
        .db_err("Failed to create user")?;

    let user = state
        .db
        .users()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Failed to create account"))?;

    let session = issue_session(&state.jwt, &state.cookies, &uuid).map_err(|e| {
        error!(error = %e, "Failed to issue session");
        ApiError::internal("Failed to create session")
    })?;

    info!(user = %uuid, "User registered");

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, session.access), (SET_COOKIE, session.refresh)]),
        Json(SessionResponse {
            success: true,
            user: UserProfile::from(&user),
        }),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown email and wrong password are indistinguishable to the client
    let user = state
        .db
        .users()
        .get_by_email(payload.email.trim(), Provider::Local)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| {
            debug!("Login attempt for unknown email");
            ApiError::unauthorized("Invalid email or password")
        })?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let matches = bcrypt::verify(&payload.password, hash).map_err(|e| {
        error!(error = %e, "Failed to verify password");
        ApiError::internal("Failed to log in")
    })?;
    if !matches {
        debug!(user = %user.uuid, "Login attempt with wrong password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let session = issue_session(&state.jwt, &state.cookies, &user.uuid).map_err(|e| {
        error!(error = %e, "Failed to issue session");
        ApiError::internal("Failed to create session")
    })?;

    info!(user = %user.uuid, "User logged in");

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, session.access), (SET_COOKIE, session.refresh)]),
        Json(SessionResponse {
            success: true,
            user: UserProfile::from(&user),
        }),
    ))
}

/// Return the authenticated user's profile.
///
/// A valid token for a since-deleted account is a 404 here, distinct from
/// the gate's 401.
async fn get_user(
    State(state): State<AuthState>,
    Auth(auth): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_uuid(&auth.user_uuid.to_string())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserProfile::from(&user)))
}

async fn logout(State(state): State<AuthState>) -> impl IntoResponse {
    let cleared = clear_session(&state.cookies);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, cleared.access), (SET_COOKIE, cleared.refresh)]),
        Json(serde_json::json!({ "success": true })),
    )
}

/// Refresh the access token using a valid refresh token.
///
/// The access token may be absent or expired; only the refresh token is
/// checked. The refresh token itself is not rotated.
async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let claims = state
        .jwt
        .verify(refresh_token, TokenPurpose::Refresh)
        .map_err(|e| {
            debug!(error = %e, "Refresh token rejected");
            ApiError::unauthorized("Not authenticated")
        })?;

    let subject = uuid::Uuid::parse_str(&claims.sub).map_err(|_| {
        debug!("Refresh token carries an invalid subject");
        ApiError::unauthorized("Not authenticated")
    })?;

    // A signing failure must fail the request, never produce an empty token
    let access_cookie =
        refresh_access_cookie(&state.jwt, &state.cookies, &subject.to_string()).map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            ApiError::internal("Failed to refresh session")
        })?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie)]),
        Json(serde_json::json!({ "success": true })),
    ))
}

#[derive(Deserialize)]
struct ExternalLoginRequest {
    token: String,
}

/// Log in with an assertion from the configured external identity provider.
/// Finds or creates the matching `external` account, then issues a full
/// session like any other login.
async fn external_login(
    State(state): State<AuthState>,
    Json(payload): Json<ExternalLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::bad_request("Token is required"));
    }

    let verifier = state
        .verifier
        .as_ref()
        .ok_or_else(|| ApiError::internal("External login is not configured"))?;

    let identity = verifier
        .verify(&payload.token)
        .await
        .map_err(|e| {
            debug!(error = %e, "External assertion rejected");
            ApiError::unauthorized("Invalid identity assertion")
        })?;

    let existing = state
        .db
        .users()
        .get_by_email(&identity.email, Provider::External)
        .await
        .db_err("Failed to look up user")?;

    let user = match existing {
        Some(user) => user,
        None => {
            let uuid = uuid::Uuid::new_v4().to_string();
            state
                .db
                .users()
                .create(&uuid, &identity.name, &identity.email, None, Provider::External)
                .await
                .db_err("Failed to create user")?;
            info!(user = %uuid, "External user created");
            state
                .db
                .users()
                .get_by_uuid(&uuid)
                .await
                .db_err("Failed to load created user")?
                .ok_or_else(|| ApiError::internal("Failed to create account"))?
        }
    };

    let session = issue_session(&state.jwt, &state.cookies, &user.uuid).map_err(|e| {
        error!(error = %e, "Failed to issue session");
        ApiError::internal("Failed to create session")
    })?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, session.access), (SET_COOKIE, session.refresh)]),
        Json(SessionResponse {
            success: true,
            user: UserProfile::from(&user),
        }),
    ))
}

/// Profile update request. Identifier and credential fields are not part of
/// the schema, so they cannot be smuggled in.
#[derive(Deserialize)]
struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
}

async fn update_profile(
    State(state): State<AuthState>,
    Auth(auth): Auth,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_uuid(&auth.user_uuid.to_string())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(email) = payload.email.as_deref() {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(ApiError::bad_request("Invalid email address"));
        }
        if user.provider == Provider::Local && email != user.email {
            let taken = state
                .db
                .users()
                .email_taken(email.trim())
                .await
                .db_err("Failed to check email availability")?;
            if taken {
                return Err(ApiError::conflict("Email is already registered"));
            }
        }
    }
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
    }

    state
        .db
        .users()
        .update_profile(
            user.id,
            payload.name.as_deref().map(str::trim),
            payload.email.as_deref().map(str::trim),
        )
        .await
        .db_err("Failed to update user")?;

    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
struct ChangePasswordRequest {
    password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<AuthState>,
    Auth(auth): Auth,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.new_password.is_empty() {
        return Err(ApiError::bad_request("New password cannot be empty"));
    }

    let user = state
        .db
        .users()
        .get_by_uuid(&auth.user_uuid.to_string())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let hash = user.password_hash.as_deref().ok_or_else(|| {
        ApiError::bad_request("Password login is not enabled for this account")
    })?;

    let matches = bcrypt::verify(&payload.password, hash).map_err(|e| {
        error!(error = %e, "Failed to verify password");
        ApiError::internal("Failed to change password")
    })?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let new_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to change password")
    })?;

    state
        .db
        .users()
        .update_password(user.id, &new_hash)
        .await
        .db_err("Failed to update password")?;

    Ok(Json(serde_json::json!({ "success": true })))
}
