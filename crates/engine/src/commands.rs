//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BankDetails, Money, TransactionKind, TransactionStatus};

/// A balance movement paired with the ledger entry that explains it.
#[derive(Clone, Debug)]
pub struct LedgerCmd {
    pub user_id: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub description: String,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
}

impl LedgerCmd {
    /// A `paid` entry with an empty description.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        amount: Money,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            kind,
            description: String::new(),
            status: TransactionStatus::Paid,
            occurred_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustDirection {
    Add,
    Subtract,
}

/// Move funds out to a bank account (pending admin payout).
#[derive(Clone, Debug)]
pub struct WithdrawalCmd {
    pub amount: Money,
    pub bank: BankDetails,
    pub occurred_at: DateTime<Utc>,
}

impl WithdrawalCmd {
    #[must_use]
    pub fn new(amount: Money, bank: BankDetails, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            bank,
            occurred_at,
        }
    }
}

/// Add a product to the catalog.
#[derive(Clone, Debug)]
pub struct ProductCmd {
    pub name: String,
    pub price: Money,
    pub daily_roi: f64,
    pub duration_days: i32,
    pub image_url: Option<String>,
}

impl ProductCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money, daily_roi: f64, duration_days: i32) -> Self {
        Self {
            name: name.into(),
            price,
            daily_roi,
            duration_days,
            image_url: None,
        }
    }

    #[must_use]
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}
