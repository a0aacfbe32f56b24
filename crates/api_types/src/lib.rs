//! Wire types shared by the HTTP server and its clients.
//!
//! Field names are camelCase on the wire. Every amount is an integer number
//! of kobo (1/100 naira).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod profile {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProfileNew {
        pub email: String,
        /// Referral code of the inviting member, if any.
        pub referred_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProfileView {
        pub id: String,
        pub email: String,
        pub role: Role,
        pub balance: i64,
        pub is_frozen: bool,
        pub is_restricted: bool,
        pub warning_message: Option<String>,
        pub used_coupons: Vec<Uuid>,
        pub referral_code: String,
        pub referred_by: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReferralCount {
        pub count: u64,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNew {
        pub name: String,
        pub price: i64,
        /// Percent of the price earned per day.
        pub daily_roi: f64,
        pub duration_days: i32,
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductView {
        pub id: Uuid,
        pub name: String,
        pub price: i64,
        pub daily_roi: f64,
        pub duration_days: i32,
        pub image_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod investment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvestmentStatus {
        Active,
        Completed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Purchase {
        pub product_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InvestmentView {
        pub id: Uuid,
        pub user_id: String,
        pub product_id: Uuid,
        pub product_name: String,
        pub amount: i64,
        pub daily_roi: f64,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        /// Status as of the request; matured plans read `completed`.
        pub status: InvestmentStatus,
        pub daily_earnings: i64,
        /// Percent elapsed, 0 to 100.
        pub progress: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SweepResult {
        pub completed: u64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Deposit,
        ManualDeposit,
        Withdrawal,
        Earnings,
        InvestmentPurchase,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Approved,
        Rejected,
        Paid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub user_id: String,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub bank_name: Option<String>,
        pub bank_code: Option<String>,
        pub account_number: Option<String>,
        pub account_name: Option<String>,
        pub proof_url: Option<String>,
        pub reference: Option<String>,
        pub reviewed_by: Option<String>,
        pub reviewed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionCreated {
        pub id: Uuid,
        pub status: TransactionStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WithdrawalNew {
        pub amount: i64,
        pub bank_name: String,
        pub bank_code: Option<String>,
        pub account_number: String,
        pub account_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ManualDepositNew {
        pub amount: i64,
        /// Where the uploaded proof-of-payment image is stored.
        pub proof_url: String,
    }

    /// Sent by the hosted checkout after a successful card payment.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentCallback {
        /// Expected amount in kobo. It must match what the gateway settled.
        pub amount: i64,
        pub reference: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PendingQuery {
        #[serde(rename = "type")]
        pub kind: TransactionKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Review {
        pub approve: bool,
    }
}

pub mod coupon {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Redeem {
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Redeemed {
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CouponNew {
        pub code: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CouponView {
        pub id: Uuid,
        pub code: String,
        pub amount: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod admin {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AdjustDirection {
        Add,
        Subtract,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Adjust {
        pub amount: i64,
        pub direction: AdjustDirection,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Restrict {
        pub restricted: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Frozen {
        pub is_frozen: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Warning {
        /// `None` or blank clears the banner.
        pub message: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Overview {
        pub user_count: u64,
        pub total_balance: i64,
        pub pending_withdrawals: i64,
        pub pending_manual_deposits: i64,
        pub active_investments: usize,
    }
}

pub mod settings {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Settings {
        pub withdrawal_min: i64,
        pub maintenance_mode: bool,
        pub withdrawals_paused: bool,
        pub deposit_bank_name: Option<String>,
        pub deposit_account_number: Option<String>,
        pub deposit_account_name: Option<String>,
        pub support_url: Option<String>,
        pub community_url: Option<String>,
        pub background_media_url: Option<String>,
        /// Ignored on update.
        pub updated_at: Option<DateTime<Utc>>,
    }

    /// Suggested polling intervals, in seconds.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Polling {
        pub admin_secs: u64,
        pub dashboard_secs: u64,
        pub chat_secs: u64,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Dashboard {
        pub profile: profile::ProfileView,
        pub active_investment: Option<investment::InvestmentView>,
        pub recent_transactions: Vec<transaction::TransactionView>,
        pub referral_count: u64,
        pub settings: settings::Settings,
        pub polling: settings::Polling,
    }
}

pub mod chat {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageNew {
        pub body: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagesQuery {
        /// Only messages strictly after this instant.
        pub since: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageView {
        pub id: Uuid,
        pub user_id: String,
        pub sender: Role,
        pub body: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod bank {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResolveQuery {
        pub account_number: String,
        pub bank_code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Resolved {
        /// `None` while the account number is incomplete or no bank is chosen.
        pub account_name: Option<String>,
    }
}
