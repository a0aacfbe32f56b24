mod common;

use chrono::{Duration, Utc};

use common::Harness;
use engine::{EngineError, GlobalSettings, Money, Role};

#[tokio::test]
async fn registration_assigns_codes_and_tracks_referrals() {
    let h = Harness::new().await;
    let ada = h
        .engine
        .register_profile("ada", "Ada@Example.com", None, Utc::now())
        .await
        .unwrap();
    assert_eq!(ada.email, "ada@example.com");
    assert_eq!(ada.role, Role::User);
    assert_eq!(ada.balance, Money::ZERO);
    assert_eq!(ada.referral_code.len(), 8);

    let code = ada.referral_code.to_lowercase();
    let bola = h
        .engine
        .register_profile("bola", "bola@example.com", Some(&code), Utc::now())
        .await
        .unwrap();
    assert_eq!(bola.referred_by.as_deref(), Some(ada.referral_code.as_str()));

    let chi = h
        .engine
        .register_profile("chi", "chi@example.com", Some("ZZZZZZZZ"), Utc::now())
        .await
        .unwrap();
    assert_eq!(chi.referred_by, None);

    let session = h.engine.open_session("ada").await.unwrap();
    assert_eq!(h.engine.referral_count(&session).await.unwrap(), 1);

    let err = h
        .engine
        .register_profile("ada2", "ADA@example.com", None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn members_only_see_their_own_records() {
    let h = Harness::new().await;
    let ada = h.member("ada", 1_000).await;
    h.member("bola", 1_000).await;

    assert!(matches!(
        h.engine.transactions_for(&ada, "bola").await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        h.engine.profiles(&ada).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(h.engine.profiles(&h.admin).await.unwrap().len(), 3);
}

#[tokio::test]
async fn moderation_flags_show_on_the_dashboard() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;

    h.engine
        .set_warning_message(&h.admin, "ada", Some("  Verify your bank details  "))
        .await
        .unwrap();
    let dashboard = h.engine.dashboard(&ada, Utc::now()).await.unwrap();
    assert_eq!(
        dashboard.profile.warning_message.as_deref(),
        Some("Verify your bank details")
    );
    assert!(dashboard.active_investment.is_none());

    let profile = h
        .engine
        .set_warning_message(&h.admin, "ada", Some(" "))
        .await
        .unwrap();
    assert_eq!(profile.warning_message, None);
}

#[tokio::test]
async fn settings_default_then_upsert() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;

    let defaults = h.engine.settings().await.unwrap();
    assert_eq!(defaults.updated_at, None);

    let mut settings = GlobalSettings {
        withdrawal_min: Money::new(100_000),
        support_url: Some("https://t.me/support".to_string()),
        ..GlobalSettings::default()
    };
    h.engine
        .update_settings(&h.admin, &settings, Utc::now())
        .await
        .unwrap();
    settings.withdrawal_min = Money::new(200_000);
    let saved = h
        .engine
        .update_settings(&h.admin, &settings, Utc::now())
        .await
        .unwrap();
    assert_eq!(saved.withdrawal_min, Money::new(200_000));
    assert_eq!(saved.support_url.as_deref(), Some("https://t.me/support"));

    assert!(matches!(
        h.engine.update_settings(&ada, &settings, Utc::now()).await,
        Err(EngineError::Forbidden(_))
    ));
    settings.withdrawal_min = Money::new(-1);
    assert!(matches!(
        h.engine.update_settings(&h.admin, &settings, Utc::now()).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn chat_threads_and_polling() {
    let h = Harness::new().await;
    let ada = h.member("ada", 0).await;
    h.member("bola", 0).await;
    let t0 = Utc::now();

    h.engine
        .send_message(&ada, "ada", "Hello, my deposit is pending", t0)
        .await
        .unwrap();
    let reply = h
        .engine
        .send_message(&h.admin, "ada", "Looking into it", t0 + Duration::seconds(5))
        .await
        .unwrap();
    assert_eq!(reply.sender, Role::Admin);

    assert!(matches!(
        h.engine.send_message(&ada, "bola", "hi", t0).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        h.engine.send_message(&ada, "ada", "   ", t0).await,
        Err(EngineError::InvalidInput(_))
    ));

    let thread = h.engine.messages(&ada, "ada", None).await.unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].sender, Role::User);

    let newer = h
        .engine
        .messages(&ada, "ada", Some(t0 + Duration::seconds(1)))
        .await
        .unwrap();
    assert_eq!(newer.len(), 1);
    assert_eq!(newer[0].id, reply.id);

    let threads = h.engine.chat_threads(&h.admin).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, reply.id);
}
