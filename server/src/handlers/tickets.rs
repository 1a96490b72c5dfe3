use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::models::TicketSummary;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Left untyped so a non-string code is reported as missing rather
    /// than as a body parsing failure.
    #[serde(default)]
    pub code: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    pub already_scanned: bool,
    pub message: &'static str,
    pub ticket: TicketSummary,
}

pub async fn scan_ticket(
    State(state): State<AppState>,
    operator: AuthUser,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    // An absent or unreadable body carries no code at all.
    let request = body.map(|Json(request)| request).ok();
    let code = request
        .as_ref()
        .and_then(|request| request.code.as_ref())
        .and_then(Value::as_str);
    let outcome = state.verifier.scan(code, &operator).await?;

    let message = if outcome.already_scanned {
        "Ticket already scanned"
    } else {
        "Ticket checked in"
    };

    Ok(Json(ScanResponse {
        success: true,
        already_scanned: outcome.already_scanned,
        message,
        ticket: outcome.ticket,
    }))
}
