mod common;

use chrono::{Duration, Utc};

use common::Harness;
use engine::{
    EngineError, InvestmentStatus, Money, TransactionKind, commands::ProductCmd,
    compute_daily_earnings,
};

async fn starter_plan(h: &Harness) -> engine::Product {
    h.engine
        .create_product(
            &h.admin,
            ProductCmd::new("Starter", Money::new(5_000_000), 2.5, 30),
            Utc::now(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn purchase_spends_the_whole_balance_once() {
    let h = Harness::new().await;
    let ada = h.member("ada", 5_000_000).await;
    let product = starter_plan(&h).await;
    let now = Utc::now();

    let investment = h.engine.purchase(&ada, product.id, now).await.unwrap();
    assert_eq!(investment.status, InvestmentStatus::Active);
    assert_eq!(investment.end_date, now + Duration::days(30));
    assert_eq!(investment.amount, Money::new(5_000_000));
    assert_eq!(compute_daily_earnings(&investment), Money::new(125_000));
    assert_eq!(h.balance("ada").await, Money::ZERO);

    let rows = h.engine.transactions(&ada).await.unwrap();
    assert_eq!(rows[0].kind, TransactionKind::InvestmentPurchase);

    h.engine
        .credit(
            &h.admin,
            engine::commands::LedgerCmd::new(
                "ada",
                Money::new(5_000_000),
                TransactionKind::Deposit,
                Utc::now(),
            ),
        )
        .await
        .unwrap();
    let err = h.engine.purchase(&ada, product.id, now).await.unwrap_err();
    assert!(matches!(err, EngineError::InvestmentLimitReached(_)));
    assert_eq!(h.balance("ada").await, Money::new(5_000_000));
    assert_eq!(
        h.engine.investments(&ada, "ada", now).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn purchase_without_funds_writes_nothing() {
    let h = Harness::new().await;
    let ada = h.member("ada", 4_999_999).await;
    let product = starter_plan(&h).await;

    let err = h
        .engine
        .purchase(&ada, product.id, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(h.balance("ada").await, Money::new(4_999_999));
    assert!(
        h.engine
            .investments(&ada, "ada", Utc::now())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn matured_investments_free_the_slot() {
    let h = Harness::new().await;
    let ada = h.member("ada", 10_000_000).await;
    let product = starter_plan(&h).await;
    let start = Utc::now() - Duration::days(31);

    h.engine.purchase(&ada, product.id, start).await.unwrap();
    let now = Utc::now();
    assert!(
        h.engine
            .active_investment(&ada, "ada", now)
            .await
            .unwrap()
            .is_none()
    );
    let listed = h.engine.investments(&ada, "ada", now).await.unwrap();
    assert_eq!(listed[0].status, InvestmentStatus::Completed);

    // A new purchase is allowed before any sweep has run.
    h.engine.purchase(&ada, product.id, now).await.unwrap();

    let swept = h
        .engine
        .complete_matured_investments(&h.admin, now)
        .await
        .unwrap();
    assert_eq!(swept, 1);
    let overview = h.engine.overview(&h.admin, now).await.unwrap();
    assert_eq!(overview.active_investments, 1);
}

#[tokio::test]
async fn dashboard_shows_progress_of_the_running_plan() {
    let h = Harness::new().await;
    let ada = h.member("ada", 5_000_000).await;
    let product = starter_plan(&h).await;
    let start = Utc::now() - Duration::days(15);
    h.engine.purchase(&ada, product.id, start).await.unwrap();

    let dashboard = h.engine.dashboard(&ada, Utc::now()).await.unwrap();
    let view = dashboard.active_investment.unwrap();
    assert!(view.progress > 49.0 && view.progress < 51.0);
    assert_eq!(view.daily_earnings, Money::new(125_000));
    assert_eq!(dashboard.recent_transactions.len(), 2);
    assert_eq!(dashboard.polling.dashboard_secs, 15);
}

#[tokio::test]
async fn unknown_products_are_not_found() {
    let h = Harness::new().await;
    let ada = h.member("ada", 5_000_000).await;
    let err = h
        .engine
        .purchase(&ada, uuid::Uuid::new_v4(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn endless_plans_are_refused_at_creation() {
    let h = Harness::new().await;
    h.member("ada", 1_000).await;

    let err = h
        .engine
        .create_product(
            &h.admin,
            ProductCmd::new("Forever", Money::new(100), 1.0, 1_000_000_000),
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(h.engine.products().await.unwrap().is_empty());
    assert_eq!(h.balance("ada").await, Money::new(1_000));
}
