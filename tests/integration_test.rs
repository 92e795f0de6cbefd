mod common;

use common::{setup_test_app, ADMIN_KEY};
use fuelpay_core::ports::Store;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn transaction_payload(customer_id: Option<i64>) -> Value {
    json!({
        "customerId": customer_id,
        "originalAmount": "500.00",
        "discountAmount": "3.50",
        "finalAmount": "496.50",
        "savings": "3.50",
        "paymentMethod": "upi"
    })
}

#[tokio::test]
async fn test_calculate_quote_pinned_values() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/transactions/calculate", base_url))
        .json(&json!({ "amount": 500 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["originalAmount"], "500.00");
    assert_eq!(quote["liters"], "5.00");
    assert_eq!(quote["discountAmount"], "3.50");
    assert_eq!(quote["finalAmount"], "496.50");
    assert_eq!(quote["savings"], "3.50");
    assert_eq!(quote["fuelPrice"], "100.00");
    assert_eq!(quote["discountPerLiter"], "0.70");
}

#[tokio::test]
async fn test_calculate_rejects_zero_fuel_price() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/settings", base_url))
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .json(&json!({ "fuelPrice": "0" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/transactions/calculate", base_url))
        .json(&json!({ "amount": 100 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid configuration"));
}

#[tokio::test]
async fn test_create_assigns_pool_code_without_ledger() {
    let (base_url, store) = setup_test_app(None).await;
    store.seed_otps(&["4321".to_string()]).await.unwrap();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/transactions", base_url))
        .json(&transaction_payload(None))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let tx: Value = res.json().await.unwrap();
    assert_eq!(tx["authCode"], "4321");
    assert_eq!(tx["status"], "paid");

    // Polling the resolved transaction just echoes the code back.
    let res = client
        .get(format!("{}/api/transactions/{}/otp-poll", base_url, tx["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let poll: Value = res.json().await.unwrap();
    assert_eq!(poll["authCode"], "4321");
}

#[tokio::test]
async fn test_create_rejects_inconsistent_amounts() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/transactions", base_url))
        .json(&json!({
            "originalAmount": "500.00",
            "discountAmount": "3.50",
            "finalAmount": "400.00",
            "savings": "3.50",
            "paymentMethod": "cash"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_allows_three_attempts_then_429() {
    let (base_url, store) = setup_test_app(None).await;
    store.seed_otps(&["4321".to_string()]).await.unwrap();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/transactions", base_url))
        .json(&transaction_payload(None))
        .send()
        .await
        .unwrap();
    let tx: Value = res.json().await.unwrap();
    let reset_url = format!("{}/api/transactions/{}/reset", base_url, tx["id"]);

    for _ in 0..3 {
        let res = client.post(&reset_url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["authCode"], "PENDING");
    }

    let res = client.post(&reset_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("attendant"));
}

#[tokio::test]
async fn test_poll_and_reset_unknown_transaction_404() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/transactions/999/otp-poll", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/api/transactions/999/reset", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_by_customer_is_newest_first() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/customers/login", base_url))
        .json(&json!({ "phone": "9876543210", "vehicleNumber": "KA01AB1234" }))
        .send()
        .await
        .unwrap();
    let customer: Value = res.json().await.unwrap();
    let customer_id = customer["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(format!("{}/api/transactions", base_url))
            .json(&transaction_payload(Some(customer_id)))
            .send()
            .await
            .unwrap();
        let tx: Value = res.json().await.unwrap();
        ids.push(tx["id"].as_i64().unwrap());
    }

    let res = client
        .get(format!(
            "{}/api/transactions?customerId={}",
            base_url, customer_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Vec<Value> = res.json().await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"].as_i64().unwrap(), ids[1]);
    assert_eq!(listed[1]["id"].as_i64().unwrap(), ids[0]);
}

#[tokio::test]
async fn test_customer_login_is_idempotent() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();
    let login_url = format!("{}/api/customers/login", base_url);

    let first: Value = client
        .post(&login_url)
        .json(&json!({ "phone": "9876543210", "vehicleNumber": "KA01AB1234" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .post(&login_url)
        .json(&json!({ "phone": "9876543210" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["vehicleNumber"], "KA01AB1234");
}

#[tokio::test]
async fn test_customer_login_rejects_bad_phone() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/customers/login", base_url))
        .json(&json!({ "phone": "not-a-phone" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_require_api_key() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/customers", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/settings", base_url))
        .json(&json!({ "fuelPrice": "98.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/customers", base_url))
        .header("Authorization", ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_settings_update_patches_in_place() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/settings", base_url))
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .json(&json!({ "fuelPrice": "95.50" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let settings: Value = client
        .get(format!("{}/api/settings", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(settings["fuelPrice"], "95.50");
    assert_eq!(settings["discountPerLiter"], "0.70");
}

#[tokio::test]
async fn test_verify_requires_matching_code() {
    let (base_url, store) = setup_test_app(None).await;
    store.seed_otps(&["4321".to_string()]).await.unwrap();
    let client = reqwest::Client::new();

    let tx: Value = client
        .post(format!("{}/api/transactions", base_url))
        .json(&transaction_payload(None))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let verify_url = format!("{}/api/transactions/{}/verify", base_url, tx["id"]);

    let res = client
        .post(&verify_url)
        .json(&json!({ "authCode": "0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(&verify_url)
        .json(&json!({ "authCode": "4321" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["authCode"], "4321");
}

#[tokio::test]
async fn test_export_csv() {
    let (base_url, store) = setup_test_app(None).await;
    store.seed_otps(&["4321".to_string()]).await.unwrap();
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/transactions", base_url))
        .json(&transaction_payload(None))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/api/transactions/export", base_url))
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv");
    let body = res.text().await.unwrap();
    assert!(body.starts_with("id,customer_id,original_amount"));
    assert!(body.contains("4321"));
}

#[tokio::test]
async fn test_health_reports_local_fallback() {
    let (base_url, _store) = setup_test_app(None).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", base_url)).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
    assert_eq!(body["ledger"], "local-fallback");
}
