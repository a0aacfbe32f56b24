//! The module contains the errors the engine can throw.
//!
//! Every operation returns [`EngineError`] at its boundary; callers surface
//! the message to the member and may retry. The main groups are:
//!
//! - validation: [`InvalidAmount`], [`InvalidInput`], [`InvalidCode`]
//! - ledger rules: [`InsufficientFunds`], [`InvestmentLimitReached`],
//!   [`AlreadyRedeemed`], [`AlreadyFinalized`]
//! - account state: [`AccountFrozen`], [`WithdrawalRestricted`],
//!   [`MaintenanceLocked`], [`Forbidden`]
//! - store: [`Conflict`] (lost a profile version race) and [`Network`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidCode`]: EngineError::InvalidCode
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`InvestmentLimitReached`]: EngineError::InvestmentLimitReached
//!  [`AlreadyRedeemed`]: EngineError::AlreadyRedeemed
//!  [`AlreadyFinalized`]: EngineError::AlreadyFinalized
//!  [`AccountFrozen`]: EngineError::AccountFrozen
//!  [`WithdrawalRestricted`]: EngineError::WithdrawalRestricted
//!  [`MaintenanceLocked`]: EngineError::MaintenanceLocked
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Conflict`]: EngineError::Conflict
//!  [`Network`]: EngineError::Network
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Investment limit reached: {0}")]
    InvestmentLimitReached(String),
    #[error("Invalid code: {0}")]
    InvalidCode(String),
    #[error("Coupon already redeemed: {0}")]
    AlreadyRedeemed(String),
    #[error("Account frozen: {0}")]
    AccountFrozen(String),
    #[error("Withdrawals restricted: {0}")]
    WithdrawalRestricted(String),
    #[error("Maintenance in progress: {0}")]
    MaintenanceLocked(String),
    #[error("Account verification failed: {0}")]
    VerificationFailed(String),
    #[error("Already finalized: {0}")]
    AlreadyFinalized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Concurrent update: {0}")]
    Conflict(String),
    #[error(transparent)]
    Network(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvestmentLimitReached(a), Self::InvestmentLimitReached(b)) => a == b,
            (Self::InvalidCode(a), Self::InvalidCode(b)) => a == b,
            (Self::AlreadyRedeemed(a), Self::AlreadyRedeemed(b)) => a == b,
            (Self::AccountFrozen(a), Self::AccountFrozen(b)) => a == b,
            (Self::WithdrawalRestricted(a), Self::WithdrawalRestricted(b)) => a == b,
            (Self::MaintenanceLocked(a), Self::MaintenanceLocked(b)) => a == b,
            (Self::VerificationFailed(a), Self::VerificationFailed(b)) => a == b,
            (Self::AlreadyFinalized(a), Self::AlreadyFinalized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Network(a), Self::Network(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
