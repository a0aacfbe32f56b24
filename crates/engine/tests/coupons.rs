mod common;

use chrono::Utc;

use common::Harness;
use engine::{EngineError, GlobalSettings, Money, TransactionKind, TransactionStatus};

#[tokio::test]
async fn coupon_redeems_once_per_member() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;
    let bola = h.member("bola", 0).await;
    let coupon = h
        .engine
        .create_coupon(&h.admin, "WELCOME50", Money::new(5_000), Utc::now())
        .await
        .unwrap();

    let credited = h
        .engine
        .redeem(&ada, "welcome50", Utc::now())
        .await
        .unwrap();
    assert_eq!(credited, Money::new(5_000));
    assert_eq!(h.balance("ada").await, Money::new(5_000));
    let profile = h.engine.profile(&ada, "ada").await.unwrap();
    assert!(profile.has_redeemed(coupon.id));

    let rows = h.engine.transactions(&ada).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, TransactionKind::Deposit);
    assert_eq!(rows[0].status, TransactionStatus::Paid);

    let err = h
        .engine
        .redeem(&ada, " WELCOME50 ", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyRedeemed(_)));
    assert_eq!(h.balance("ada").await, Money::new(5_000));

    h.engine
        .redeem(&bola, "WELCOME50", Utc::now())
        .await
        .unwrap();
    assert_eq!(h.balance("bola").await, Money::new(5_000));
}

#[tokio::test]
async fn unknown_and_duplicate_codes() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;

    let err = h.engine.redeem(&ada, "NOPE", Utc::now()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCode(_)));

    h.engine
        .create_coupon(&h.admin, "bonus", Money::new(100), Utc::now())
        .await
        .unwrap();
    let err = h
        .engine
        .create_coupon(&h.admin, "BONUS", Money::new(100), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
    assert_eq!(h.engine.coupons(&h.admin).await.unwrap().len(), 1);
}

#[tokio::test]
async fn maintenance_blocks_members_only() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;
    h.engine
        .create_coupon(&h.admin, "BONUS", Money::new(100), Utc::now())
        .await
        .unwrap();
    let settings = GlobalSettings {
        maintenance_mode: true,
        ..GlobalSettings::default()
    };
    h.engine
        .update_settings(&h.admin, &settings, Utc::now())
        .await
        .unwrap();

    let err = h.engine.redeem(&ada, "BONUS", Utc::now()).await.unwrap_err();
    assert!(matches!(err, EngineError::MaintenanceLocked(_)));
    assert!(h.engine.settings().await.unwrap().maintenance_mode);
}
