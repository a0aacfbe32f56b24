//! Checks against the payment gateway: bank account names and card
//! payments.
//!
//! The engine only defines the contracts; the HTTP client lives with the
//! server. A resolved name is advisory until a withdrawal is created with it.

use std::future::Future;

use crate::{EngineError, Money, ResultEngine};

/// Length of a Nigerian NUBAN account number.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// Resolves the holder name of a bank account.
pub trait AccountResolver: Send + Sync {
    fn resolve(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> impl Future<Output = ResultEngine<String>> + Send;
}

/// A card payment the gateway reports as settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub reference: String,
    pub amount: Money,
}

/// Looks up a payment reference with the gateway.
///
/// Implementations return `VerificationFailed` for unknown references and
/// for payments that did not succeed.
pub trait PaymentVerifier: Send + Sync {
    fn verify(&self, reference: &str) -> impl Future<Output = ResultEngine<VerifiedPayment>> + Send;
}

pub fn is_account_number(account_number: &str) -> bool {
    account_number.len() == ACCOUNT_NUMBER_LEN
        && account_number.chars().all(|c| c.is_ascii_digit())
}

/// Whether a lookup is worth issuing yet: a full account number and a bank.
pub fn should_resolve(account_number: &str, bank_code: &str) -> bool {
    is_account_number(account_number.trim()) && !bank_code.trim().is_empty()
}

/// Resolve the holder name once the inputs are complete.
///
/// Returns `Ok(None)` while the account number is still being typed or no
/// bank is selected; resolver failures and blank names surface as
/// `VerificationFailed`.
pub async fn resolve_account_name<R: AccountResolver>(
    resolver: &R,
    account_number: &str,
    bank_code: &str,
) -> ResultEngine<Option<String>> {
    if !should_resolve(account_number, bank_code) {
        return Ok(None);
    }
    let name = resolver
        .resolve(account_number.trim(), bank_code.trim())
        .await
        .map_err(|err| match err {
            EngineError::VerificationFailed(msg) => EngineError::VerificationFailed(msg),
            other => EngineError::VerificationFailed(other.to_string()),
        })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::VerificationFailed(
            "resolver returned an empty account name".to_string(),
        ));
    }
    Ok(Some(name.to_string()))
}
