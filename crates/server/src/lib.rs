use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use bank::PaystackClient;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod admin;
mod bank;
mod chat;
mod coupons;
mod investments;
mod member;
mod payments;
mod server;
mod views;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) | EngineError::AccountFrozen(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::AlreadyRedeemed(_)
        | EngineError::AlreadyFinalized(_)
        | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::MaintenanceLocked(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_)
        | EngineError::InvalidCode(_)
        | EngineError::InsufficientFunds(_)
        | EngineError::InvestmentLimitReached(_)
        | EngineError::WithdrawalRestricted(_)
        | EngineError::VerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Network(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
