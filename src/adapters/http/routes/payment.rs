use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::{jwt, use_cases::orders::CreateOrderInput},
};

const SIGNATURE_HEADER: &str = "x-verify";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_payment))
        .route("/verify", post(verify_payment))
        .route("/status/{transaction_id}", get(payment_status))
        .route("/webhook", post(gateway_webhook))
}

#[derive(Deserialize)]
struct CreatePaymentPayload {
    user_id: Option<String>,
    plan_id: String,
    source: Option<String>,
    provider_id: Option<String>,
    track_id: Option<String>,
    metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct CreatePaymentResponse {
    success: bool,
    transaction_id: String,
    payment_url: String,
}

/// POST /payment/create
async fn create_payment(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<CreatePaymentPayload>,
) -> AppResult<impl IntoResponse> {
    let caller = current_user(&headers, &jar, &app_state)?;

    // Users can only buy for themselves.
    let user_id = match payload.user_id {
        Some(user_id) if user_id != caller => return Err(AppError::Forbidden),
        _ => caller,
    };

    let order = app_state
        .order_use_cases
        .create_order(CreateOrderInput {
            user_id,
            plan_id: payload.plan_id,
            source_context: payload.source.unwrap_or_default(),
            provider_id: payload.provider_id,
            track_id: payload.track_id,
            metadata: payload.metadata,
        })
        .await?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        transaction_id: order.transaction_id,
        payment_url: order.payment_url,
    }))
}

#[derive(Deserialize)]
struct VerifyPaymentPayload {
    transaction_id: String,
}

/// POST /payment/verify
async fn verify_payment(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<VerifyPaymentPayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&headers, &jar, &app_state)?;

    let result = app_state
        .verification_use_cases
        .verify(payload.transaction_id.trim(), &user_id)
        .await?;
    Ok(Json(result))
}

/// GET /payment/status/{transaction_id}
async fn payment_status(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(transaction_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&headers, &jar, &app_state)?;

    let result = app_state
        .verification_use_cases
        .status(&transaction_id, &user_id)
        .await?;
    Ok(Json(result))
}

/// POST /payment/webhook
///
/// Called by the gateway only. Authenticated by the `X-VERIFY` checksum over
/// the raw `response` field; answers 200 for every authenticated delivery.
async fn gateway_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let ack = app_state
        .webhook_use_cases
        .handle(signature, &body)
        .await?;
    Ok(Json(ack))
}

/// Caller identity from a bearer token, falling back to the `access_token` cookie.
fn current_user(headers: &HeaderMap, jar: &CookieJar, app_state: &AppState) -> AppResult<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match bearer {
        Some(token) => token.to_string(),
        None => jar
            .get("access_token")
            .map(|c| c.value().to_string())
            .ok_or(AppError::InvalidCredentials)?,
    };

    let claims = jwt::verify(&token, &app_state.config.jwt_secret)?;
    if claims.sub.trim().is_empty() {
        return Err(AppError::InvalidCredentials);
    }
    Ok(claims.sub)
}
