//! Coupon endpoints

use api_types::coupon::{CouponNew, CouponView, Redeem, Redeemed};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{Money, Session};

use crate::{ServerError, server::ServerState, views::coupon_view};

/// Handle requests redeeming a coupon code for the caller
pub async fn redeem(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<Redeem>,
) -> Result<Json<Redeemed>, ServerError> {
    let amount = state
        .engine
        .redeem(&session, &payload.code, Utc::now())
        .await?;
    Ok(Json(Redeemed {
        amount: amount.kobo(),
    }))
}

pub async fn coupon_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<CouponNew>,
) -> Result<(StatusCode, Json<CouponView>), ServerError> {
    let coupon = state
        .engine
        .create_coupon(&session, &payload.code, Money::new(payload.amount), Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(coupon_view(coupon))))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CouponView>>, ServerError> {
    let coupons = state.engine.coupons(&session).await?;
    Ok(Json(coupons.into_iter().map(coupon_view).collect()))
}
