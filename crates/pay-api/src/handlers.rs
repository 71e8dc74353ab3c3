//! # Request Handlers
//!
//! Axum request handlers exposing the adapter operations.
//! Gateway results are passed through as JSON with the gateway's HTTP
//! status; adapter errors map through `PaymentError::status_code`.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pay_amazon::{AuthorizeRequest, GatewayResponse, SignedButton, DEFAULT_CANCELLATION_REASON};
use pay_core::{Headers, PaymentError, PaymentIntent, Quote, QuoteRepository};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Optional store selector in the query string
#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    #[serde(default)]
    pub store_id: Option<String>,
}

/// Register or replace a quote
#[derive(Debug, Deserialize)]
pub struct PutQuoteRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    pub currency_code: String,
    pub grand_total: f64,
    #[serde(default)]
    pub reserved_order_id: Option<String>,
}

/// Update a checkout session for a quote
#[derive(Debug, Deserialize)]
pub struct UpdateCheckoutSessionRequest {
    pub quote_id: String,
    #[serde(default)]
    pub payment_intent: PaymentIntent,
}

/// Amount-bearing request used by complete, capture and refund
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    pub amount: f64,
    pub currency_code: String,
}

/// Close a charge permission
#[derive(Debug, Deserialize)]
pub struct CloseChargePermissionRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub cancel_pending_charges: bool,
}

/// Create a charge
#[derive(Debug, Deserialize)]
pub struct CreateChargeRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    pub charge_permission_id: String,
    pub amount: f64,
    pub currency_code: String,
    #[serde(default)]
    pub capture_now: bool,
}

/// Capture a charge
#[derive(Debug, Deserialize)]
pub struct CaptureChargeRequest {
    #[serde(flatten)]
    pub amount: AmountRequest,
    /// Extra headers forwarded to the gateway
    #[serde(default)]
    pub headers: Headers,
}

/// Cancel a charge
#[derive(Debug, Default, Deserialize)]
pub struct CancelChargeRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Refund a charge
#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    pub charge_id: String,
    #[serde(flatten)]
    pub amount: AmountRequest,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    if code >= 500 {
        error!("Adapter error: {}", err);
    }
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

/// Gateway status as HTTP status; 502 when the gateway gave none
fn gateway_status(response: &GatewayResponse) -> StatusCode {
    response
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

fn gateway_to_response(response: GatewayResponse) -> (StatusCode, Json<Value>) {
    (gateway_status(&response), Json(response.into_value()))
}

fn respond(result: Result<GatewayResponse, PaymentError>) -> ApiResult {
    result
        .map(gateway_to_response)
        .map_err(payment_error_to_response)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pay-adapter",
        "version": env!("CARGO_PKG_VERSION"),
        "offline": state.offline
    }))
}

/// Register or replace a quote
#[instrument(skip(state, request))]
pub async fn put_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
    Json(request): Json<PutQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    if !request.grand_total.is_finite() || request.grand_total < 0.0 {
        return Err(payment_error_to_response(PaymentError::InvalidRequest(
            "grand_total must be finite and non-negative".to_string(),
        )));
    }

    let store_id = state.store_id(request.store_id.as_deref()).to_string();
    let mut quote = Quote::new(quote_id, store_id, request.currency_code, request.grand_total);
    quote.reserved_order_id = request.reserved_order_id;

    state.quotes.insert(quote.clone()).await;
    info!("Stored quote {}", quote.id);

    Ok((StatusCode::OK, Json(quote)))
}

/// Fetch a quote
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    state
        .quotes
        .get(&quote_id)
        .await
        .map(Json)
        .map_err(payment_error_to_response)
}

/// Fetch a checkout session
#[instrument(skip(state))]
pub async fn get_checkout_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> ApiResult {
    let store_id = state.store_id(query.store_id.as_deref());
    respond(
        state
            .adapter
            .checkout()
            .get_checkout_session(store_id, &session_id)
            .await,
    )
}

/// Update a checkout session from a stored quote
#[instrument(skip(state, request), fields(quote_id = %request.quote_id))]
pub async fn update_checkout_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<UpdateCheckoutSessionRequest>,
) -> ApiResult {
    let mut quote = state
        .quotes
        .get(&request.quote_id)
        .await
        .map_err(payment_error_to_response)?;

    respond(
        state
            .adapter
            .checkout()
            .update_checkout_session(&mut quote, &session_id, request.payment_intent)
            .await,
    )
}

/// Complete a checkout session
#[instrument(skip(state, request))]
pub async fn complete_checkout_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> ApiResult {
    let store_id = state.store_id(request.store_id.as_deref());
    respond(
        state
            .adapter
            .checkout()
            .complete_checkout_session(store_id, &session_id, request.amount, &request.currency_code)
            .await,
    )
}

/// Fetch a charge permission
#[instrument(skip(state))]
pub async fn get_charge_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> ApiResult {
    let store_id = state.store_id(query.store_id.as_deref());
    respond(
        state
            .adapter
            .permissions()
            .get_charge_permission(store_id, &permission_id)
            .await,
    )
}

/// Close a charge permission
#[instrument(skip(state, request))]
pub async fn close_charge_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
    Json(request): Json<CloseChargePermissionRequest>,
) -> ApiResult {
    let store_id = state.store_id(request.store_id.as_deref());
    respond(
        state
            .adapter
            .permissions()
            .close_charge_permission(
                store_id,
                &permission_id,
                &request.reason,
                request.cancel_pending_charges,
            )
            .await,
    )
}

/// Create a charge
#[instrument(skip(state, request), fields(charge_permission_id = %request.charge_permission_id))]
pub async fn create_charge(
    State(state): State<AppState>,
    Json(request): Json<CreateChargeRequest>,
) -> ApiResult {
    let store_id = state.store_id(request.store_id.as_deref());
    respond(
        state
            .adapter
            .charges()
            .create_charge(
                store_id,
                &request.charge_permission_id,
                request.amount,
                &request.currency_code,
                request.capture_now,
            )
            .await,
    )
}

/// Fetch a charge
#[instrument(skip(state))]
pub async fn get_charge(
    State(state): State<AppState>,
    Path(charge_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> ApiResult {
    let store_id = state.store_id(query.store_id.as_deref());
    respond(state.adapter.charges().get_charge(store_id, &charge_id).await)
}

/// Capture a charge
#[instrument(skip(state, request))]
pub async fn capture_charge(
    State(state): State<AppState>,
    Path(charge_id): Path<String>,
    Json(request): Json<CaptureChargeRequest>,
) -> ApiResult {
    let store_id = state.store_id(request.amount.store_id.as_deref());
    respond(
        state
            .adapter
            .charges()
            .capture_charge(
                store_id,
                &charge_id,
                request.amount.amount,
                &request.amount.currency_code,
                request.headers,
            )
            .await,
    )
}

/// Cancel a charge
#[instrument(skip(state, body))]
pub async fn cancel_charge(
    State(state): State<AppState>,
    Path(charge_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    // body is optional for cancel
    let request: CancelChargeRequest = if body.is_empty() {
        CancelChargeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            payment_error_to_response(PaymentError::InvalidRequest(format!(
                "Invalid cancel request: {}",
                e
            )))
        })?
    };
    let store_id = state.store_id(request.store_id.as_deref());
    let reason = request.reason.as_deref().unwrap_or(DEFAULT_CANCELLATION_REASON);
    respond(
        state
            .adapter
            .charges()
            .cancel_charge(store_id, &charge_id, reason)
            .await,
    )
}

/// Refund a charge
#[instrument(skip(state, request), fields(charge_id = %request.charge_id))]
pub async fn create_refund(
    State(state): State<AppState>,
    Json(request): Json<CreateRefundRequest>,
) -> ApiResult {
    let store_id = state.store_id(request.amount.store_id.as_deref());
    respond(
        state
            .adapter
            .charges()
            .create_refund(
                store_id,
                &request.charge_id,
                request.amount.amount,
                &request.amount.currency_code,
            )
            .await,
    )
}

/// Fetch a refund
#[instrument(skip(state))]
pub async fn get_refund(
    State(state): State<AppState>,
    Path(refund_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> ApiResult {
    let store_id = state.store_id(query.store_id.as_deref());
    respond(state.adapter.charges().get_refund(store_id, &refund_id).await)
}

/// Authorize payment for a quote
#[instrument(skip(state, request), fields(quote_id = %request.quote_id))]
pub async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> ApiResult {
    let outcome = state
        .adapter
        .charges()
        .authorize(&request)
        .await
        .map_err(payment_error_to_response)?;

    info!(charge_created = outcome.charge_created(), "Authorize finished");

    let status = gateway_status(outcome.response());
    let body = serde_json::to_value(&outcome)
        .map_err(|e| payment_error_to_response(PaymentError::from(e)))?;
    Ok((status, Json(body)))
}

/// Buyer profile for a sign-in token
#[instrument(skip(state, token))]
pub async fn get_buyer(State(state): State<AppState>, Path(token): Path<String>) -> ApiResult {
    respond(state.adapter.checkout().get_buyer(&token).await)
}

/// Signed button payload (`login` or `checkout`)
#[instrument(skip(state))]
pub async fn get_button(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<SignedButton>, ApiError> {
    let buttons = state.adapter.buttons();
    let store_id = query.store_id.as_deref();
    let signed = match kind.as_str() {
        "login" => buttons.signed_login_button(store_id),
        "checkout" => buttons.signed_checkout_button(store_id),
        other => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(
                    ErrorResponse::new(format!("Unknown button: {}", other), 404)
                        .with_details("expected 'login' or 'checkout'"),
                ),
            ))
        }
    };

    signed.map(Json).map_err(payment_error_to_response)
}
