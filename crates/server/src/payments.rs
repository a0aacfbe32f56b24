//! Card payment confirmation from the hosted checkout.

use api_types::transaction::{PaymentCallback, TransactionCreated};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::{Money, Session};

use crate::{ServerError, server::ServerState, views::map_status};

/// Credit a payment after Paystack confirms the reference. Replays of the
/// same reference return the original transaction and credit nothing.
pub async fn callback(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCallback>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let tx = state
        .engine
        .confirm_payment(
            &session,
            state.paystack.as_ref(),
            Money::new(payload.amount),
            &payload.reference,
            Utc::now(),
        )
        .await?;
    Ok(Json(TransactionCreated {
        id: tx.id,
        status: map_status(tx.status),
    }))
}
