mod auth;
mod error;
mod transactions;

use axum::Router;
use std::sync::Arc;

use crate::auth::{CookieSettings, ExternalAssertionVerifier};
use crate::db::Database;
use crate::jwt::JwtConfig;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    cookies: CookieSettings,
    verifier: Option<Arc<dyn ExternalAssertionVerifier>>,
) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
        cookies: cookies.clone(),
        verifier,
    };

    let transactions_state = transactions::TransactionsState {
        db,
        jwt,
        cookies,
    };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/transactions", transactions::router(transactions_state))
}
