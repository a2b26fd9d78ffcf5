//! API integration tests
//!
//! These run against a live server with a migrated database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to create a book and return its ID
async fn create_book(client: &Client, token: &str, title: &str, copies: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book ID")
}

/// Helper to create a reader and return its ID
async fn create_reader(client: &Client, token: &str, login: &str) -> i64 {
    let response = client
        .post(format!("{}/readers", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "login": login,
            "password": "testpass",
            "full_name": "Test Reader"
        }))
        .send()
        .await
        .expect("Failed to create reader");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse reader response");
    body["id"].as_i64().expect("No reader ID")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["account"]["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_assess_fine_scenarios() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // 19 days late: inside the grace window, nothing owed
    let response = client
        .post(format!("{}/fines/assess", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "due_date": "2024-01-01T12:00:00Z",
            "returned_date": "2024-01-20T12:00:00Z",
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 0);

    // 45 days late: 15 chargeable days
    let response = client
        .post(format!("{}/fines/assess", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "due_date": "2024-01-01T12:00:00Z",
            "returned_date": "2024-02-15T12:00:00Z",
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 75000);
    assert_eq!(body["reason"], "late_return");

    // Damaged on time: surcharge only
    let response = client
        .post(format!("{}/fines/assess", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "due_date": "2024-01-01T12:00:00Z",
            "returned_date": "2024-01-05T12:00:00Z",
            "condition": "damaged"
        }))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 100000);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_cycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let book_id = create_book(&client, &token, "Borrow Cycle Test", 1).await;
    let reader_id = create_reader(&client, &token, &format!("cycle{}", suffix)).await;

    // Borrow
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "reader_id": reader_id,
            "book_id": book_id
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["id"].as_i64().expect("No borrow ID");
    assert_eq!(body["status"], "borrowing");

    // The only copy is out now
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 0);

    // Return in good condition, on time: no fine, no payment
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    assert_eq!(body["slip"]["assessment"]["total"], 0);
    assert!(body["fine"].is_null());

    // Returning again conflicts
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_damaged_return_records_unpaid_fine() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let book_id = create_book(&client, &token, "Damaged Return Test", 1).await;
    let reader_id = create_reader(&client, &token, &format!("damaged{}", suffix)).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["id"].as_i64().expect("No borrow ID");

    // No payment supplied: the fine stays on the account
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "condition": "damaged" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let fine_id = body["fine"]["id"].as_i64().expect("No fine recorded");
    assert_eq!(body["fine"]["status"], "unpaid");
    assert_eq!(body["fine"]["amount"], 100000);

    // Pay it
    let response = client
        .put(format!("{}/fines/{}/pay", BASE_URL, fine_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "payment_method": "cash" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "paid");
    assert!(body["receipt_no"].is_string());

    // Paying twice conflicts
    let response = client
        .put(format!("{}/fines/{}/pay", BASE_URL, fine_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "payment_method": "cash" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_renewal_limits() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let book_id = create_book(&client, &token, "Renewal Test", 1).await;
    let reader_id = create_reader(&client, &token, &format!("renewal{}", suffix)).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["id"].as_i64().expect("No borrow ID");

    // A renewal far past the 30-day window is rejected
    let response = client
        .post(format!("{}/borrows/{}/renew", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "new_due_date": "2099-01-01T00:00:00Z" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_reservation_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let book_id = create_book(&client, &token, "Reservation Test", 1).await;
    let borrower_id = create_reader(&client, &token, &format!("holder{}", suffix)).await;
    let reserver_id = create_reader(&client, &token, &format!("reserver{}", suffix)).await;

    // Take the only copy out so the title becomes reservable
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": borrower_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Reserving an available title is rejected, so check first
    let response = client
        .get(format!(
            "{}/reservations/check?reader_id={}&book_id={}",
            BASE_URL, reserver_id, book_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["allowed"], true);

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reserver_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["id"].as_i64().expect("No reservation ID");
    assert_eq!(body["status"], "pending");

    // A second claim by the same reader is rejected
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reserver_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Cancel; pending -> cancelled is allowed
    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "cancelled");

    // Cancelled is terminal
    let response = client
        .post(format!("{}/reservations/{}/notify", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrows"]["active"].is_number());
    assert!(body["fines"]["unpaid_amount"].is_number());
    assert!(body["reservations"]["pending"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_get_settings() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/settings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["late_fee_per_day"].is_number());
    assert!(body["max_renewals"].is_number());
}
