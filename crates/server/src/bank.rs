//! Paystack client: bank account-name lookup and card payment verification.

use api_types::bank::{ResolveQuery, Resolved};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::{
    EngineError, Money,
    verification::{AccountResolver, PaymentVerifier, VerifiedPayment, resolve_account_name},
};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug)]
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct ResolveResponse {
    status: bool,
    message: Option<String>,
    data: Option<ResolveData>,
}

#[derive(Deserialize)]
struct ResolveData {
    account_name: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    status: bool,
    message: Option<String>,
    data: Option<VerifyData>,
}

#[derive(Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    /// Settled amount in kobo.
    amount: i64,
}

fn verification_failed(err: reqwest::Error) -> EngineError {
    tracing::warn!("paystack request failed: {err}");
    EngineError::VerificationFailed("could not reach the payment gateway".to_string())
}

/// Paystack references are alphanumeric with `-`, `.` and `=`.
fn is_reference(reference: &str) -> bool {
    !reference.is_empty()
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '='))
}

impl AccountResolver for PaystackClient {
    async fn resolve(&self, account_number: &str, bank_code: &str) -> Result<String, EngineError> {
        let url = format!("{}/bank/resolve", self.base_url.trim_end_matches('/'));
        let body: ResolveResponse = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .query(&[("account_number", account_number), ("bank_code", bank_code)])
            .send()
            .await
            .map_err(verification_failed)?
            .json()
            .await
            .map_err(verification_failed)?;

        match body.data {
            Some(data) if body.status => Ok(data.account_name),
            _ => Err(EngineError::VerificationFailed(
                body.message
                    .unwrap_or_else(|| "account could not be resolved".to_string()),
            )),
        }
    }
}

impl PaymentVerifier for PaystackClient {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, EngineError> {
        if !is_reference(reference) {
            return Err(EngineError::VerificationFailed(format!(
                "malformed payment reference {reference:?}"
            )));
        }
        let url = format!(
            "{}/transaction/verify/{reference}",
            self.base_url.trim_end_matches('/')
        );
        let body: VerifyResponse = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(verification_failed)?
            .json()
            .await
            .map_err(verification_failed)?;

        match body.data {
            Some(data) if body.status && data.status == "success" => Ok(VerifiedPayment {
                reference: data.reference,
                amount: Money::new(data.amount),
            }),
            Some(data) if body.status => Err(EngineError::VerificationFailed(format!(
                "payment {reference} is {}",
                data.status
            ))),
            _ => Err(EngineError::VerificationFailed(
                body.message
                    .unwrap_or_else(|| "payment could not be verified".to_string()),
            )),
        }
    }
}

/// Handle requests resolving the holder name of a bank account
pub async fn resolve(
    State(state): State<ServerState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Resolved>, ServerError> {
    let account_name =
        resolve_account_name(state.paystack.as_ref(), &query.account_number, &query.bank_code)
            .await?;
    Ok(Json(Resolved { account_name }))
}
