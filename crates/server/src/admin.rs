//! Admin console endpoints
//!
//! Every handler here passes the caller's session to the engine, which
//! rejects non-admins with `Forbidden`.

use api_types::{
    admin::{Adjust, AdjustDirection as ApiDirection, Frozen, Overview, Restrict, Warning},
    investment::SweepResult,
    product::{ProductNew, ProductView},
    profile::ProfileView,
    settings::Settings,
    transaction::{PendingQuery, Review, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    Money, Session,
    commands::{AdjustDirection, ProductCmd},
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{
        product_view, profile_view, settings_from_view, settings_view, transaction_view,
        unmap_kind,
    },
};

pub async fn overview(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Overview>, ServerError> {
    let overview = state.engine.overview(&session, Utc::now()).await?;
    Ok(Json(Overview {
        user_count: overview.user_count,
        total_balance: overview.total_balance.kobo(),
        pending_withdrawals: overview.pending_withdrawals.kobo(),
        pending_manual_deposits: overview.pending_manual_deposits.kobo(),
        active_investments: overview.active_investments,
    }))
}

pub async fn profiles(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProfileView>>, ServerError> {
    let profiles = state.engine.profiles(&session).await?;
    Ok(Json(profiles.into_iter().map(profile_view).collect()))
}

pub async fn toggle_freeze(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Frozen>, ServerError> {
    let is_frozen = state.engine.toggle_freeze(&session, &user_id).await?;
    Ok(Json(Frozen { is_frozen }))
}

pub async fn set_restricted(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<Restrict>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .set_restricted(&session, &user_id, payload.restricted)
        .await?;
    Ok(Json(profile_view(profile)))
}

pub async fn set_warning(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<Warning>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .set_warning_message(&session, &user_id, payload.message.as_deref())
        .await?;
    Ok(Json(profile_view(profile)))
}

/// Handle manual balance corrections; subtractions clamp at zero
pub async fn adjust(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<Adjust>,
) -> Result<Json<ProfileView>, ServerError> {
    let direction = match payload.direction {
        ApiDirection::Add => AdjustDirection::Add,
        ApiDirection::Subtract => AdjustDirection::Subtract,
    };
    let profile = state
        .engine
        .adjust_by_admin(
            &session,
            &user_id,
            Money::new(payload.amount),
            direction,
            Utc::now(),
        )
        .await?;
    Ok(Json(profile_view(profile)))
}

/// Handle requests for the review queue of one transaction type
pub async fn pending(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let rows = state
        .engine
        .pending_transactions(&session, unmap_kind(query.kind))
        .await?;
    Ok(Json(rows.into_iter().map(transaction_view).collect()))
}

pub async fn review_withdrawal(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<Review>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .handle_withdrawal(&session, tx_id, payload.approve, Utc::now())
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn review_manual_deposit(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<Review>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .handle_manual_deposit(&session, tx_id, payload.approve, Utc::now())
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn product_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let mut cmd = ProductCmd::new(
        payload.name,
        Money::new(payload.price),
        payload.daily_roi,
        payload.duration_days,
    );
    if let Some(image_url) = payload.image_url {
        cmd = cmd.image_url(image_url);
    }
    let product = state
        .engine
        .create_product(&session, cmd, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(product_view(product))))
}

pub async fn update_settings(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<Settings>,
) -> Result<Json<Settings>, ServerError> {
    let saved = state
        .engine
        .update_settings(&session, &settings_from_view(payload), Utc::now())
        .await?;
    Ok(Json(settings_view(saved)))
}

/// Handle requests persisting `completed` on matured investments
pub async fn sweep(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<SweepResult>, ServerError> {
    let completed = state
        .engine
        .complete_matured_investments(&session, Utc::now())
        .await?;
    Ok(Json(SweepResult { completed }))
}
