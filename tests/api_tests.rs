//! API integration tests
//!
//! These run against a live server with at least two seeded users
//! (ids 1 and 2). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const OWNER_ID: i32 = 1;
const BORROWER_ID: i32 = 2;

/// Create a tool owned by OWNER_ID and return its id
async fn create_test_tool(client: &Client) -> i64 {
    let response = client
        .post(format!("{}/tools", BASE_URL))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({
            "title": "Cordless Drill",
            "description": "18V cordless drill with two batteries",
            "category": "power tools",
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No tool ID")
}

/// Request a reservation for the given tool as BORROWER_ID
async fn request_reservation(client: &Client, tool_id: i64, start: &str, end: &str) -> Value {
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({
            "tool_id": tool_id,
            "start_date": start,
            "end_date": end
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

/// Deactivate a tool so it stops affecting other tests
async fn cleanup_tool(client: &Client, tool_id: i64) {
    let _ = client
        .delete(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("X-User-Id", OWNER_ID)
        .send()
        .await;
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
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_list_tools() {
    let client = Client::new();

    let response = client
        .get(format!("{}/tools", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_tool_requires_actor() {
    let client = Client::new();

    let response = client
        .post(format!("{}/tools", BASE_URL))
        .json(&json!({
            "title": "Orphan Tool",
            "condition": "fair"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_update_tool_owner_only() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let response = client
        .put(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({
            "title": "Hijacked",
            "description": "Not yours",
            "category": "power tools",
            "condition": "fair"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_reservation_full_lifecycle() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    // Borrower requests
    let reservation = request_reservation(&client, tool_id, "2030-03-01", "2030-03-03").await;
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");
    assert_eq!(reservation["status"], "requested");

    // Owner accepts
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "accepted");

    // Overlapping request is now rejected: shared boundary day conflicts
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({
            "tool_id": tool_id,
            "start_date": "2030-03-03",
            "end_date": "2030-03-05"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // An adjacent range (next day onward) is fine
    let reservation = request_reservation(&client, tool_id, "2030-03-04", "2030-03-06").await;
    assert_eq!(reservation["status"], "requested");

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_accept_revalidates_against_competitors() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    // Two overlapping requests are both tolerated while pending
    let first = request_reservation(&client, tool_id, "2030-04-01", "2030-04-05").await;
    let second = request_reservation(&client, tool_id, "2030-04-03", "2030-04-07").await;

    // Accept the first
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, first["id"]))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Accepting the second must now fail re-validation
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, second["id"]))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // The second can still be declined
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, second["id"]))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "declined" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_role_enforcement() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let reservation = request_reservation(&client, tool_id, "2030-05-01", "2030-05-02").await;
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");

    // Borrower may not accept their own request
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Owner may not cancel on the borrower's behalf
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Borrower cancels
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Terminal status: nothing further is legal
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_complete_before_due_is_a_no_op() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let reservation = request_reservation(&client, tool_id, "2030-11-01", "2030-11-03").await;
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");

    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation_id))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The end date has not passed, so completion is a no-op both times
    for _ in 0..2 {
        let response = client
            .post(format!("{}/reservations/{}/complete", BASE_URL, reservation_id))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["completed"], false);
    }

    // The reservation is untouched
    let response = client
        .get(format!("{}/reservations/{}", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "accepted");

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_complete_missing_reservation() {
    let client = Client::new();

    let response = client
        .post(format!("{}/reservations/999999/complete", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_reserving_deactivated_tool_not_found() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let response = client
        .delete(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("X-User-Id", OWNER_ID)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({
            "tool_id": tool_id,
            "start_date": "2030-12-01",
            "end_date": "2030-12-02"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_reserve_own_tool() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({
            "tool_id": tool_id,
            "start_date": "2030-06-01",
            "end_date": "2030-06-02"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_reversed_dates_rejected() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({
            "tool_id": tool_id,
            "start_date": "2030-07-10",
            "end_date": "2030-07-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_blocked_dates_and_availability() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let reservation = request_reservation(&client, tool_id, "2030-08-01", "2030-08-03").await;
    let response = client
        .put(format!("{}/reservations/{}/status", BASE_URL, reservation["id"]))
        .header("X-User-Id", OWNER_ID)
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Blocked dates enumerate each day of the accepted span
    let response = client
        .get(format!("{}/tools/{}/blocked-dates", BASE_URL, tool_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let dates: Vec<&str> = body
        .as_array()
        .expect("Expected array")
        .iter()
        .filter_map(|d| d.as_str())
        .collect();
    assert!(dates.contains(&"2030-08-01"));
    assert!(dates.contains(&"2030-08-02"));
    assert!(dates.contains(&"2030-08-03"));

    // Availability check agrees
    let response = client
        .get(format!(
            "{}/tools/{}/availability?start_date=2030-08-03&end_date=2030-08-05",
            BASE_URL, tool_id
        ))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["conflict"], true);

    let response = client
        .get(format!(
            "{}/tools/{}/availability?start_date=2030-08-04&end_date=2030-08-05",
            BASE_URL, tool_id
        ))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["conflict"], false);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_review_requires_completed_reservation() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let reservation = request_reservation(&client, tool_id, "2030-09-01", "2030-09-02").await;
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");

    // Not completed yet: ineligible
    let response = client
        .get(format!("{}/reservations/{}/can-review", BASE_URL, reservation_id))
        .header("X-User-Id", BORROWER_ID)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["can_review"], false);

    // Posting anyway is rejected
    let response = client
        .post(format!("{}/reservations/{}/review", BASE_URL, reservation_id))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({ "rating": 5, "comment": "Great drill" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_review_rating_bounds() {
    let client = Client::new();
    let tool_id = create_test_tool(&client).await;

    let reservation = request_reservation(&client, tool_id, "2030-10-01", "2030-10-02").await;

    let response = client
        .post(format!("{}/reservations/{}/review", BASE_URL, reservation["id"]))
        .header("X-User-Id", BORROWER_ID)
        .json(&json!({ "rating": 6 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    cleanup_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_get_missing_reservation() {
    let client = Client::new();

    let response = client
        .get(format!("{}/reservations/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
