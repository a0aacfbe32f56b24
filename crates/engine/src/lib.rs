//! Ledger core of the Nodefolio investment simulator.
//!
//! Every balance change goes through [`Engine`], which pairs it with a
//! [`Transaction`] row inside one store transaction and guards the profile
//! row with an optimistic version check.

pub use chat::ChatMessage;
pub use coupons::Coupon;
pub use error::EngineError;
pub use investments::{Investment, InvestmentStatus, compute_daily_earnings, compute_progress};
pub use money::Money;
pub use ops::{AdminOverview, Dashboard, Engine, EngineBuilder, InvestmentView};
pub use products::Product;
pub use profiles::Profile;
pub use session::{Role, Session};
pub use settings::{DepositAccount, GlobalSettings, PollingHints};
pub use transactions::{BankDetails, Transaction, TransactionKind, TransactionStatus};

mod chat;
pub mod commands;
mod coupons;
mod error;
mod investments;
mod money;
mod ops;
mod products;
mod profiles;
mod session;
mod settings;
mod transactions;
mod util;
pub mod verification;

type ResultEngine<T> = Result<T, EngineError>;
