//! Member API endpoints: profile, dashboard, ledger and money movements.

use api_types::{
    dashboard::Dashboard,
    profile::{ProfileNew, ProfileView, ReferralCount},
    settings::Settings,
    transaction::{ManualDepositNew, TransactionCreated, TransactionView, WithdrawalNew},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use chrono::Utc;
use engine::{BankDetails, Money, Session, commands::WithdrawalCmd};

use crate::{
    ServerError,
    server::{ProfileHeader, ServerState},
    views::{dashboard_view, map_status, profile_view, settings_view, transaction_view},
};

/// Handle requests creating the profile of a newly signed-up identity
pub async fn register(
    TypedHeader(profile): TypedHeader<ProfileHeader>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileNew>,
) -> Result<(StatusCode, Json<ProfileView>), ServerError> {
    let profile = state
        .engine
        .register_profile(
            &profile.0,
            &payload.email,
            payload.referred_by.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(profile_view(profile))))
}

/// Handle requests for the caller's own profile
pub async fn me(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .profile(&session, session.profile_id())
        .await?;
    Ok(Json(profile_view(profile)))
}

pub async fn dashboard(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Dashboard>, ServerError> {
    let now = Utc::now();
    let dashboard = state.engine.dashboard(&session, now).await?;
    Ok(Json(dashboard_view(dashboard, now)))
}

pub async fn referrals(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ReferralCount>, ServerError> {
    let count = state.engine.referral_count(&session).await?;
    Ok(Json(ReferralCount { count }))
}

/// Handle requests listing the caller's ledger, newest first
pub async fn transactions(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let rows = state.engine.transactions(&session).await?;
    Ok(Json(rows.into_iter().map(transaction_view).collect()))
}

pub async fn settings(
    State(state): State<ServerState>,
) -> Result<Json<Settings>, ServerError> {
    let settings = state.engine.settings().await?;
    Ok(Json(settings_view(settings)))
}

/// Handle requests for a payout to a bank account
pub async fn withdrawal_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawalNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let bank = BankDetails {
        bank_name: payload.bank_name,
        bank_code: payload.bank_code,
        account_number: payload.account_number,
        account_name: payload.account_name,
    };
    let tx = state
        .engine
        .request_withdrawal(
            &session,
            WithdrawalCmd::new(Money::new(payload.amount), bank, Utc::now()),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: tx.id,
            status: map_status(tx.status),
        }),
    ))
}

/// Handle requests claiming a bank transfer, pending admin review
pub async fn manual_deposit_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<ManualDepositNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let tx = state
        .engine
        .submit_manual_deposit(
            &session,
            Money::new(payload.amount),
            &payload.proof_url,
            Utc::now(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: tx.id,
            status: map_status(tx.status),
        }),
    ))
}
