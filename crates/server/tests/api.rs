use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use engine::{Engine, Money, TransactionKind, commands::LedgerCmd};
use migration::MigratorTrait;
use server::{PaystackClient, ServerState, router};

struct TestApp {
    router: Router,
    engine: Arc<Engine>,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        engine
            .register_profile("admin", "admin@example.com", None, Utc::now())
            .await
            .unwrap();
        engine.promote_to_admin("admin").await.unwrap();

        let engine = Arc::new(engine);
        let state = ServerState {
            engine: engine.clone(),
            paystack: Arc::new(PaystackClient::new("http://127.0.0.1:9", "sk_test")),
        };
        Self {
            router: router(state),
            engine,
        }
    }

    async fn member(&self, id: &str, balance: i64) {
        let (status, _) = self
            .send(
                "POST",
                "/profiles",
                Some(id),
                Some(json!({ "email": format!("{id}@example.com") })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        if balance > 0 {
            let admin = self.engine.open_session("admin").await.unwrap();
            self.engine
                .credit(
                    &admin,
                    LedgerCmd::new(id, Money::new(balance), TransactionKind::Deposit, Utc::now()),
                )
                .await
                .unwrap();
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        profile: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(profile) = profile {
            builder = builder.header("x-profile-id", profile);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

#[tokio::test]
async fn missing_or_unknown_identity_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app.send("GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/me", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/me", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_read_profile() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;

    let (status, body) = app.send("GET", "/me", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["balance"], 0);
    assert_eq!(body["role"], "user");

    let (status, body) = app
        .send(
            "POST",
            "/profiles",
            Some("alice"),
            Some(json!({ "email": "other@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn purchase_flow_over_http() {
    let app = TestApp::new().await;
    app.member("alice", 10_000_000).await;

    let (status, product) = app
        .send(
            "POST",
            "/admin/products",
            Some("admin"),
            Some(json!({
                "name": "Starter",
                "price": 5_000_000,
                "dailyRoi": 5.0,
                "durationDays": 30,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, investment) = app
        .send(
            "POST",
            "/investments",
            Some("alice"),
            Some(json!({ "productId": product_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(investment["status"], "active");
    assert_eq!(investment["dailyEarnings"], 250_000);

    let (status, _) = app
        .send(
            "POST",
            "/investments",
            Some("alice"),
            Some(json!({ "productId": product_id })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, dashboard) = app.send("GET", "/dashboard", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["profile"]["balance"], 5_000_000);
    assert_eq!(dashboard["activeInvestment"]["productName"], "Starter");
    assert_eq!(
        dashboard["recentTransactions"][0]["type"],
        "investment_purchase"
    );
}

#[tokio::test]
async fn members_cannot_reach_admin_routes() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;

    let (status, _) = app.send("GET", "/admin/overview", Some("alice"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, overview) = app.send("GET", "/admin/overview", Some("admin"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["userCount"], 2);
}

#[tokio::test]
async fn withdrawal_review_over_http() {
    let app = TestApp::new().await;
    app.member("alice", 2_000_000).await;

    let (status, created) = app
        .send(
            "POST",
            "/withdrawals",
            Some("alice"),
            Some(json!({
                "amount": 1_000_000,
                "bankName": "Access Bank",
                "bankCode": "044",
                "accountNumber": "0123456789",
                "accountName": "Alice Doe",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let tx_id = created["id"].as_str().unwrap().to_string();

    let (status, pending) = app
        .send(
            "GET",
            "/admin/transactions/pending?type=withdrawal",
            Some("admin"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let uri = format!("/admin/withdrawals/{tx_id}/review");
    let (status, reviewed) = app
        .send("POST", &uri, Some("admin"), Some(json!({ "approve": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "rejected");
    assert_eq!(reviewed["reviewedBy"], "admin");

    let (status, _) = app
        .send("POST", &uri, Some("admin"), Some(json!({ "approve": true })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, me) = app.send("GET", "/me", Some("alice"), None).await;
    assert_eq!(me["balance"], 2_000_000);
}

#[tokio::test]
async fn maintenance_mode_returns_503_for_members() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;

    let (status, _) = app
        .send(
            "POST",
            "/admin/coupons",
            Some("admin"),
            Some(json!({ "code": "WELCOME50", "amount": 500_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(
            "PUT",
            "/admin/settings",
            Some("admin"),
            Some(json!({
                "withdrawalMin": 100_000,
                "maintenanceMode": true,
                "withdrawalsPaused": false,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/coupons/redeem",
            Some("alice"),
            Some(json!({ "code": "welcome50" })),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, settings) = app.send("GET", "/settings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["maintenanceMode"], true);
}

#[tokio::test]
async fn frozen_member_is_rejected_at_the_door() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;

    let (status, body) = app
        .send("POST", "/admin/profiles/alice/freeze", Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFrozen"], true);

    let (status, _) = app.send("GET", "/me", Some("alice"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn chat_thread_is_private_to_its_owner() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;
    app.member("bob", 0).await;

    let (status, _) = app
        .send(
            "POST",
            "/chat/alice/messages",
            Some("alice"),
            Some(json!({ "body": "hello" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("GET", "/chat/alice/messages", Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, messages) = app
        .send("GET", "/chat/alice/messages", Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages[0]["body"], "hello");
    assert_eq!(messages[0]["sender"], "user");
}

#[tokio::test]
async fn bank_resolve_needs_a_session() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;
    let uri = "/banks/resolve?accountNumber=01234&bankCode=044";

    let (status, _) = app.send("GET", uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("GET", uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountName"], Value::Null);
}

#[tokio::test]
async fn unverifiable_payment_callback_credits_nothing() {
    let app = TestApp::new().await;
    app.member("alice", 0).await;

    let (status, body) = app
        .send(
            "POST",
            "/payments/callback",
            Some("alice"),
            Some(json!({ "amount": 9_000_000_000i64, "reference": "made/up" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (_, me) = app.send("GET", "/me", Some("alice"), None).await;
    assert_eq!(me["balance"], 0);
}
