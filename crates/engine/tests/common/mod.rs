#![allow(dead_code)]

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, Money, Role, Session, TransactionKind,
    commands::LedgerCmd,
    verification::{PaymentVerifier, VerifiedPayment},
};
use migration::MigratorTrait;

/// Gateway stand-in that knows a fixed set of settled references.
#[derive(Default)]
pub struct Gateway(HashMap<String, Money>);

impl Gateway {
    pub fn settled(mut self, reference: &str, kobo: i64) -> Self {
        self.0.insert(reference.to_string(), Money::new(kobo));
        self
    }
}

impl PaymentVerifier for Gateway {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, EngineError> {
        self.0
            .get(reference)
            .map(|amount| VerifiedPayment {
                reference: reference.to_string(),
                amount: *amount,
            })
            .ok_or_else(|| EngineError::VerificationFailed(format!("{reference} not found")))
    }
}

pub struct Harness {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub admin: Session,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();

        engine
            .register_profile("admin", "admin@example.com", None, Utc::now())
            .await
            .unwrap();
        engine.promote_to_admin("admin").await.unwrap();
        let admin = engine.open_session("admin").await.unwrap();
        assert_eq!(admin.role(), Role::Admin);

        Self { engine, db, admin }
    }

    /// Register a member and fund them with a paid deposit of `balance` kobo.
    pub async fn member(&self, id: &str, balance: i64) -> Session {
        self.engine
            .register_profile(id, &format!("{id}@example.com"), None, Utc::now())
            .await
            .unwrap();
        if balance > 0 {
            self.engine
                .credit(
                    &self.admin,
                    LedgerCmd::new(id, Money::new(balance), TransactionKind::Deposit, Utc::now())
                        .description("Opening balance"),
                )
                .await
                .unwrap();
        }
        self.engine.open_session(id).await.unwrap()
    }

    pub async fn balance(&self, id: &str) -> Money {
        self.engine.balance(&self.admin, id).await.unwrap()
    }
}
