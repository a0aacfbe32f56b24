//! Ledger primitives.
//!
//! A `Transaction` is an append-only entry explaining one balance movement
//! (or a pending request for one). Only `status` and the review fields ever
//! change after insert, and only while the row is `pending`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    ManualDeposit,
    Withdrawal,
    Earnings,
    InvestmentPurchase,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::ManualDeposit => "manual_deposit",
            Self::Withdrawal => "withdrawal",
            Self::Earnings => "earnings",
            Self::InvestmentPurchase => "investment_purchase",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "manual_deposit" => Ok(Self::ManualDeposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "earnings" => Ok(Self::Earnings),
            "investment_purchase" => Ok(Self::InvestmentPurchase),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Destination account of a withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub bank_code: Option<String>,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub bank: Option<BankDetails>,
    pub proof_url: Option<String>,
    /// Payment gateway reference, unique across the ledger.
    pub reference: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        user_id: String,
        amount: Money,
        kind: TransactionKind,
        status: TransactionStatus,
        description: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            kind,
            status,
            description,
            created_at,
            bank: None,
            proof_url: None,
            reference: None,
            reviewed_by: None,
            reviewed_at: None,
        })
    }

    #[must_use]
    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.bank = Some(bank);
        self
    }

    #[must_use]
    pub fn with_proof(mut self, proof_url: String) -> Self {
        self.proof_url = Some(proof_url);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: String) -> Self {
        self.reference = Some(reference);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: String,
    pub status: String,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub bank_name: Option<String>,
    pub bank_code: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub proof_url: Option<String>,
    pub reference: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let bank = tx.bank.as_ref();
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            amount: ActiveValue::Set(tx.amount.kobo()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            bank_name: ActiveValue::Set(bank.map(|b| b.bank_name.clone())),
            bank_code: ActiveValue::Set(bank.and_then(|b| b.bank_code.clone())),
            account_number: ActiveValue::Set(bank.map(|b| b.account_number.clone())),
            account_name: ActiveValue::Set(bank.map(|b| b.account_name.clone())),
            proof_url: ActiveValue::Set(tx.proof_url.clone()),
            reference: ActiveValue::Set(tx.reference.clone()),
            reviewed_by: ActiveValue::Set(tx.reviewed_by.clone()),
            reviewed_at: ActiveValue::Set(tx.reviewed_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let bank = match (model.bank_name, model.account_number, model.account_name) {
            (Some(bank_name), Some(account_number), Some(account_name)) => Some(BankDetails {
                bank_name,
                bank_code: model.bank_code,
                account_number,
                account_name,
            }),
            _ => None,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            user_id: model.user_id,
            amount: Money::new(model.amount),
            description: model.description,
            created_at: model.created_at,
            bank,
            proof_url: model.proof_url,
            reference: model.reference,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at,
        })
    }
}
