//! Product catalog and investment endpoints

use api_types::{
    investment::{InvestmentView, Purchase},
    product::ProductView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::Session;

use crate::{
    ServerError,
    server::ServerState,
    views::{investment_view, product_view},
};

pub async fn products(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state.engine.products().await?;
    Ok(Json(products.into_iter().map(product_view).collect()))
}

/// Handle requests buying a product with the caller's balance
pub async fn purchase(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<Purchase>,
) -> Result<(StatusCode, Json<InvestmentView>), ServerError> {
    let now = Utc::now();
    let investment = state
        .engine
        .purchase(&session, payload.product_id, now)
        .await?;
    Ok((StatusCode::CREATED, Json(investment_view(investment, now))))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<InvestmentView>>, ServerError> {
    let now = Utc::now();
    let investments = state
        .engine
        .investments(&session, session.profile_id(), now)
        .await?;
    Ok(Json(
        investments
            .into_iter()
            .map(|investment| investment_view(investment, now))
            .collect(),
    ))
}
