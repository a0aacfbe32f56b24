use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{PaystackClient, admin, bank, chat, coupons, investments, member, payments};
use engine::{Engine, EngineError};

static PROFILE_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-profile-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub paystack: Arc<PaystackClient>,
}

/// `TypedHeader` for the authenticated profile id
///
/// The identity gateway in front of the server verifies the member and
/// forwards their profile id in "x-profile-id".
#[derive(Debug)]
pub(crate) struct ProfileHeader(pub(crate) String);

impl Header for ProfileHeader {
    fn name() -> &'static axum::http::HeaderName {
        &PROFILE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(ProfileHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-profile-id header"),
        }
    }
}

async fn auth(
    profile: Result<TypedHeader<ProfileHeader>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Ok(TypedHeader(profile)) = profile else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let session = match state.engine.open_session(&profile.0).await {
        Ok(session) => session,
        Err(EngineError::AccountFrozen(_)) => return Err(StatusCode::FORBIDDEN),
        Err(EngineError::Network(err)) => {
            tracing::error!("database error while opening session: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/profiles", post(member::register))
        .route("/products", get(investments::products))
        .route("/settings", get(member::settings));

    let authed = Router::new()
        .route("/me", get(member::me))
        .route("/dashboard", get(member::dashboard))
        .route("/referrals", get(member::referrals))
        .route("/transactions", get(member::transactions))
        .route("/withdrawals", post(member::withdrawal_new))
        .route("/deposits/manual", post(member::manual_deposit_new))
        .route("/payments/callback", post(payments::callback))
        .route("/banks/resolve", get(bank::resolve))
        .route(
            "/investments",
            get(investments::list).post(investments::purchase),
        )
        .route("/coupons/redeem", post(coupons::redeem))
        .route(
            "/chat/{user_id}/messages",
            get(chat::list).post(chat::send),
        )
        .route("/admin/overview", get(admin::overview))
        .route("/admin/profiles", get(admin::profiles))
        .route("/admin/profiles/{user_id}/freeze", post(admin::toggle_freeze))
        .route(
            "/admin/profiles/{user_id}/restriction",
            put(admin::set_restricted),
        )
        .route(
            "/admin/profiles/{user_id}/warning",
            put(admin::set_warning),
        )
        .route("/admin/profiles/{user_id}/adjust", post(admin::adjust))
        .route("/admin/transactions/pending", get(admin::pending))
        .route(
            "/admin/withdrawals/{tx_id}/review",
            post(admin::review_withdrawal),
        )
        .route(
            "/admin/deposits/{tx_id}/review",
            post(admin::review_manual_deposit),
        )
        .route("/admin/products", post(admin::product_new))
        .route(
            "/admin/coupons",
            get(coupons::list).post(coupons::coupon_new),
        )
        .route("/admin/settings", put(admin::update_settings))
        .route("/admin/investments/sweep", post(admin::sweep))
        .route("/admin/chat/threads", get(chat::threads))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(authed).with_state(state)
}

pub async fn run(engine: Engine, paystack: PaystackClient, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, paystack, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    paystack: PaystackClient,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        paystack: Arc::new(paystack),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    paystack: PaystackClient,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, paystack, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
