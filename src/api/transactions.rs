//! Transaction CRUD endpoints, all behind the authorization gate.
//!
//! - GET    `/` - List the authenticated user's transactions
//! - POST   `/` - Create a transaction
//! - PATCH  `/{id}` - Update one of the user's transactions
//! - DELETE `/{id}` - Delete one of the user's transactions
//! - DELETE `/` - Delete all of the user's transactions

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{Auth, CookieSettings};
use crate::db::{Database, TransactionKind, User};
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct TransactionsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookieSettings,
}

impl_has_auth_state!(TransactionsState);

pub fn router(state: TransactionsState) -> Router {
    Router::new()
        .route(
            "/",
            get(list_transactions)
                .post(create_transaction)
                .delete(delete_all_transactions),
        )
        .route(
            "/{id}",
            delete(delete_transaction).patch(update_transaction),
        )
        .with_state(state)
}

/// Resolve the authenticated subject to its account row.
///
/// Authentication proved the token, not that the account still exists;
/// a stale subject is a 404 here, not a 401.
async fn resolve_user(state: &TransactionsState, subject: &uuid::Uuid) -> Result<User, ApiError> {
    state
        .db
        .users()
        .get_by_uuid(&subject.to_string())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn list_transactions(
    State(state): State<TransactionsState>,
    Auth(auth): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_user(&state, &auth.user_uuid).await?;

    let transactions = state
        .db
        .transactions()
        .list_by_user(user.id)
        .await
        .db_err("Failed to list transactions")?;

    Ok(Json(transactions))
}

#[derive(Deserialize)]
struct CreateTransactionRequest {
    date: Option<String>,
    description: String,
    category: String,
    amount: f64,
    kind: Option<TransactionKind>,
}

fn validate_date(date: &str) -> Result<(), ApiError> {
    DateTime::parse_from_rfc3339(date)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request("Invalid date, expected RFC 3339"))
}

async fn create_transaction(
    State(state): State<TransactionsState>,
    Auth(auth): Auth,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_user(&state, &auth.user_uuid).await?;

    if payload.description.trim().is_empty() {
        return Err(ApiError::bad_request("Description is required"));
    }
    if payload.category.trim().is_empty() {
        return Err(ApiError::bad_request("Category is required"));
    }

    let date = match payload.date {
        Some(date) => {
            validate_date(&date)?;
            date
        }
        None => Utc::now().to_rfc3339(),
    };
    let kind = payload.kind.unwrap_or(TransactionKind::Expense);

    let uuid = uuid::Uuid::new_v4().to_string();
    state
        .db
        .transactions()
        .create(
            &uuid,
            user.id,
            &date,
            payload.description.trim(),
            payload.category.trim(),
            payload.amount,
            kind,
        )
        .await
        .db_err("Failed to create transaction")?;

    let transaction = state
        .db
        .transactions()
        .get_for_user(&uuid, user.id)
        .await
        .db_err("Failed to load created transaction")?
        .ok_or_else(|| ApiError::internal("Failed to create transaction"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[derive(Deserialize)]
struct UpdateTransactionRequest {
    date: Option<String>,
    description: Option<String>,
    category: Option<String>,
    amount: Option<f64>,
    kind: Option<TransactionKind>,
}

async fn update_transaction(
    State(state): State<TransactionsState>,
    Auth(auth): Auth,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;
    let user = resolve_user(&state, &auth.user_uuid).await?;

    if let Some(date) = payload.date.as_deref() {
        validate_date(date)?;
    }
    if let Some(description) = payload.description.as_deref() {
        if description.trim().is_empty() {
            return Err(ApiError::bad_request("Description cannot be empty"));
        }
    }
    if let Some(category) = payload.category.as_deref() {
        if category.trim().is_empty() {
            return Err(ApiError::bad_request("Category cannot be empty"));
        }
    }

    let updated = state
        .db
        .transactions()
        .update_for_user(
            &id,
            user.id,
            payload.date.as_deref(),
            payload.description.as_deref().map(str::trim),
            payload.category.as_deref().map(str::trim),
            payload.amount,
            payload.kind,
        )
        .await
        .db_err("Failed to update transaction")?;

    if !updated {
        return Err(ApiError::not_found("Transaction not found"));
    }

    let transaction = state
        .db
        .transactions()
        .get_for_user(&id, user.id)
        .await
        .db_err("Failed to load updated transaction")?
        .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<TransactionsState>,
    Auth(auth): Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;
    let user = resolve_user(&state, &auth.user_uuid).await?;

    let deleted = state
        .db
        .transactions()
        .delete_for_user(&id, user.id)
        .await
        .db_err("Failed to delete transaction")?;

    if !deleted {
        return Err(ApiError::not_found("Transaction not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_transactions(
    State(state): State<TransactionsState>,
    Auth(auth): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_user(&state, &auth.user_uuid).await?;

    let deleted = state
        .db
        .transactions()
        .delete_all_for_user(user.id)
        .await
        .db_err("Failed to delete transactions")?;

    Ok(Json(serde_json::json!({ "success": true, "deleted": deleted })))
}
