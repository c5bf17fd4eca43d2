//! HTTP gateway for the account service

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_service::AccountService;
use axum::{
    extract::Request,
    http::Uri,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::account::{
    create_account, delete_account, deposit, get_account, list_accounts, list_owner_accounts,
    owner_open_accounts, update_account, withdraw,
};
use crate::error::ApiError;

/// App state shared across handlers
pub struct AppState {
    /// Account service
    pub account_service: Arc<AccountService>,
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::account::create_account,
        api::account::list_accounts,
        api::account::get_account,
        api::account::update_account,
        api::account::delete_account,
        api::account::list_owner_accounts,
        api::account::owner_open_accounts,
        api::account::deposit,
        api::account::withdraw,
    ),
    components(
        schemas(
            common::model::account::Account,
            common::model::account::AccountStatus,
            common::model::account::AccountType,
            common::model::account::CreateAccountRequest,
            common::model::account::UpdateAccountRequest,
            api::account::AmountRequest,
            api::account::OpenAccountsSummary,
        )
    ),
    tags(
        (name = "account", description = "Account management endpoints")
    ),
    info(
        title = "Cooperative Accounts API",
        version = "1.0.0",
        description = "Savings and checking accounts: lifecycle, lookups, deposits and withdrawals"
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    router_with_log_level(state, Level::INFO)
}

/// Build the application router, tracing requests at `log_level`
pub fn router_with_log_level(state: Arc<AppState>, log_level: Level) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route(
            "/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/:id/deposit", post(deposit))
        .route("/accounts/:id/withdraw", post(withdraw))
        .route("/owners/:owner_id/accounts", get(list_owner_accounts))
        .route("/owners/:owner_id/open-accounts", get(owner_open_accounts));

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(swagger_ui)
        .fallback(fallback)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(log_level))
                .on_response(DefaultOnResponse::new().level(log_level)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Span for one request, tagged with the id set by `SetRequestIdLayer`
fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
