//! Tests for the transaction endpoints.
//!
//! Tests cover:
//! - Create/list/update/delete through the API
//! - Input validation (required fields, date format, uuid paths)
//! - Per-user isolation
//! - Bulk deletion

mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

async fn create_transaction(
    app: &axum::Router,
    cookies: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request_with_cookies(
            "POST",
            "/api/transactions",
            cookies,
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn list_transactions(app: &axum::Router, cookies: &str) -> Vec<serde_json::Value> {
    let response = app
        .clone()
        .oneshot(request_with_cookies("GET", "/api/transactions", cookies))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await.as_array().unwrap().clone()
}

// =============================================================================
// Create and List Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_list_transaction() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let created = create_transaction(
        &app,
        &cookies,
        serde_json::json!({
            "description": "Groceries",
            "category": "Food",
            "amount": 42.5
        }),
    )
    .await;

    assert_eq!(created["description"], "Groceries");
    assert_eq!(created["category"], "Food");
    assert_eq!(created["amount"], 42.5);
    // Defaults applied when omitted
    assert_eq!(created["kind"], "expense");
    assert!(created["date"].as_str().is_some());

    // The public id is a UUID; row ids never leak
    let id = created["id"].as_str().expect("id should be a string");
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert!(created.get("user_id").is_none());

    let transactions = list_transactions(&app, &cookies).await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_with_explicit_fields() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let created = create_transaction(
        &app,
        &cookies,
        serde_json::json!({
            "date": "2026-08-01T12:00:00+00:00",
            "description": "Salary",
            "category": "Work",
            "amount": 3000.0,
            "kind": "income"
        }),
    )
    .await;

    assert_eq!(created["date"], "2026-08-01T12:00:00+00:00");
    assert_eq!(created["kind"], "income");
}

#[tokio::test]
async fn test_create_validation() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let cases = [
        serde_json::json!({ "description": "", "category": "Food", "amount": 1.0 }),
        serde_json::json!({ "description": "Groceries", "category": " ", "amount": 1.0 }),
        serde_json::json!({
            "description": "Groceries",
            "category": "Food",
            "amount": 1.0,
            "date": "yesterday"
        }),
    ];

    for body in cases {
        let response = app
            .clone()
            .oneshot(json_request_with_cookies(
                "POST",
                "/api/transactions",
                &cookies,
                body.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Should reject {}",
            body
        );
    }
}

#[tokio::test]
async fn test_list_is_ordered_by_date_descending() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    for (date, description) in [
        ("2026-08-02T00:00:00+00:00", "middle"),
        ("2026-08-01T00:00:00+00:00", "oldest"),
        ("2026-08-03T00:00:00+00:00", "newest"),
    ] {
        create_transaction(
            &app,
            &cookies,
            serde_json::json!({
                "date": date,
                "description": description,
                "category": "Misc",
                "amount": 1.0
            }),
        )
        .await;
    }

    let transactions = list_transactions(&app, &cookies).await;
    let order: Vec<&str> = transactions
        .iter()
        .map(|t| t["description"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["newest", "middle", "oldest"]);
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_transaction_partial() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let created = create_transaction(
        &app,
        &cookies,
        serde_json::json!({ "description": "Groceries", "category": "Food", "amount": 42.5 }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_with_cookies(
            "PATCH",
            &format!("/api/transactions/{}", id),
            &cookies,
            serde_json::json!({ "amount": 50.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["amount"], 50.0);
    // Untouched fields survive a partial update
    assert_eq!(updated["description"], "Groceries");
    assert_eq!(updated["category"], "Food");
}

#[tokio::test]
async fn test_update_validation() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let created = create_transaction(
        &app,
        &cookies,
        serde_json::json!({ "description": "Groceries", "category": "Food", "amount": 42.5 }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let cases = [
        serde_json::json!({ "description": "" }),
        serde_json::json!({ "category": " " }),
        serde_json::json!({ "date": "tomorrow" }),
    ];

    for body in cases {
        let response = app
            .clone()
            .oneshot(json_request_with_cookies(
                "PATCH",
                &format!("/api/transactions/{}", id),
                &cookies,
                body.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Should reject {}",
            body
        );
    }
}

#[tokio::test]
async fn test_update_missing_transaction_not_found() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let response = app
        .clone()
        .oneshot(json_request_with_cookies(
            "PATCH",
            &format!("/api/transactions/{}", uuid::Uuid::new_v4()),
            &cookies,
            serde_json::json!({ "amount": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed ids are a client error, not a lookup miss
    let response = app
        .oneshot(json_request_with_cookies(
            "PATCH",
            "/api/transactions/not-a-uuid",
            &cookies,
            serde_json::json!({ "amount": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[tokio::test]
async fn test_delete_transaction() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    let created = create_transaction(
        &app,
        &cookies,
        serde_json::json!({ "description": "Groceries", "category": "Food", "amount": 42.5 }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_with_cookies(
            "DELETE",
            &format!("/api/transactions/{}", id),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(list_transactions(&app, &cookies).await.is_empty());

    // Deleting again is a miss
    let response = app
        .oneshot(request_with_cookies(
            "DELETE",
            &format!("/api/transactions/{}", id),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_all_transactions() {
    let (app, _, _) = create_test_app().await;
    let cookies = register_user(&app, "Alice", "alice@example.com", "correct-horse").await;

    for i in 0..3 {
        create_transaction(
            &app,
            &cookies,
            serde_json::json!({
                "description": format!("Item {}", i),
                "category": "Misc",
                "amount": 1.0
            }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(request_with_cookies("DELETE", "/api/transactions", &cookies))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted"], 3);

    assert!(list_transactions(&app, &cookies).await.is_empty());
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[tokio::test]
async fn test_users_cannot_touch_each_others_transactions() {
    let (app, _, _) = create_test_app().await;
    let alice = register_user(&app, "Alice", "alice@example.com", "password-a").await;
    let bob = register_user(&app, "Bob", "bob@example.com", "password-b").await;

    let created = create_transaction(
        &app,
        &alice,
        serde_json::json!({ "description": "Secret", "category": "Private", "amount": 9.99 }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    // Bob sees nothing
    assert!(list_transactions(&app, &bob).await.is_empty());

    // Bob cannot update or delete Alice's transaction; existence is not revealed
    let response = app
        .clone()
        .oneshot(json_request_with_cookies(
            "PATCH",
            &format!("/api/transactions/{}", id),
            &bob,
            serde_json::json!({ "amount": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request_with_cookies(
            "DELETE",
            &format!("/api/transactions/{}", id),
            &bob,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Bob's bulk delete only touches his own rows
    let response = app
        .clone()
        .oneshot(request_with_cookies("DELETE", "/api/transactions", &bob))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted"], 0);

    // Alice's transaction is untouched
    let transactions = list_transactions(&app, &alice).await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], 9.99);
}

#[tokio::test]
async fn test_all_transaction_routes_require_auth() {
    let (app, _, _) = create_test_app().await;
    let id = uuid::Uuid::new_v4();

    let requests = [
        request("GET", "/api/transactions"),
        json_request(
            "POST",
            "/api/transactions",
            serde_json::json!({ "description": "x", "category": "y", "amount": 1.0 }),
        ),
        json_request(
            "PATCH",
            &format!("/api/transactions/{}", id),
            serde_json::json!({ "amount": 1.0 }),
        ),
        request("DELETE", &format!("/api/transactions/{}", id)),
        request("DELETE", "/api/transactions"),
    ];

    for req in requests {
        let uri = req.uri().clone();
        let method = req.method().clone();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require auth",
            method,
            uri
        );
    }
}
