// File: tests/integration_tests.rs


use axum::http::{Method, StatusCode};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use test_helpers::TestApp;
use uuid::Uuid;

fn balance_of(body: &Value) -> Decimal {
    body["data"]["balance"].as_str().unwrap().parse().unwrap()
}

async fn open_account(app: &TestApp, owner_id: Uuid, number: &str, balance: &str) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/accounts",
            Some(json!({
                "owner_id": owner_id,
                "account_number": number,
                "balance": balance,
                "account_type": "CHECKING",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_balance_scenario() {
    let app = TestApp::new();
    let id = open_account(&app, Uuid::new_v4(), "002-100000001", "1000.00").await;

    let steps = [
        ("deposit", "500.00", StatusCode::OK, Some(dec!(1500.00))),
        ("withdraw", "300.00", StatusCode::OK, Some(dec!(1200.00))),
        ("withdraw", "1200.00", StatusCode::OK, Some(dec!(0.00))),
        ("withdraw", "0.01", StatusCode::CONFLICT, None),
    ];

    for (operation, amount, expected_status, expected_balance) in steps {
        let (status, body) = app
            .request(
                Method::POST,
                &format!("/api/v1/accounts/{}/{}", id, operation),
                Some(json!({ "amount": amount })),
            )
            .await;

        assert_eq!(status, expected_status, "{} {}: {}", operation, amount, body);
        if let Some(expected) = expected_balance {
            assert_eq!(balance_of(&body), expected);
        }
    }

    let (_, body) = app.request(Method::GET, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(body["data"]["balance"], "0.00");
}

#[tokio::test]
async fn test_account_lifecycle() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let id = open_account(&app, owner, "002-100000002", "10.00").await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/v1/accounts/{}", id),
            Some(json!({ "account_number": "002-100000003", "account_type": "SAVINGS" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account_number"], "002-100000003");
    assert_eq!(body["data"]["account_type"], "SAVINGS");
    assert_eq!(body["data"]["version"], 1);

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/accounts/{}", id),
            Some(json!({ "status": "CANCELLED" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/accounts/{}", id),
            Some(json!({ "account_type": "CHECKING" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cancelled accounts are still found by balance operations, which then refuse
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/accounts/{}/deposit", id),
            Some(json!({ "amount": "1.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "account_not_active");

    let (_, body) = app.request(Method::GET, &format!("/api/v1/owners/{}/accounts", owner), None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_concurrent_withdrawals_cannot_overdraw() {
    let app = TestApp::new();
    let id = open_account(&app, Uuid::new_v4(), "002-100000004", "100.00").await;
    let uri = format!("/api/v1/accounts/{}/withdraw", id);

    let results = join_all((0..2).map(|_| {
        app.request(Method::POST, &uri, Some(json!({ "amount": "60.00" })))
    }))
    .await;

    let succeeded = results.iter().filter(|(status, _)| *status == StatusCode::OK).count();
    let refused: Vec<_> = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CONFLICT)
        .collect();
    assert_eq!(succeeded, 1);
    assert_eq!(refused.len(), 1);
    assert_eq!(refused[0].1["error"]["code"], "insufficient_balance");

    let (_, body) = app.request(Method::GET, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(balance_of(&body), dec!(40.00));
}
