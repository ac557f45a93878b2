use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::counter_store::{CounterStore, CounterStoreError};
use crate::runtime::contract::{CountBody, ErrorBody, ErrorCategory};
use crate::runtime::routing::{action_for_event, CounterAction};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Reads or increments the counter for one HTTP API event.
///
/// Always produces a well-formed response: store failures become 500
/// envelopes carrying the error category and detail.
pub fn handle_counter_event(event: &Value, store: &impl CounterStore) -> ApiGatewayResponse {
    let action = action_for_event(event);
    let result = match action {
        CounterAction::Increment => store.increment_count(),
        CounterAction::Read => store.get_count(),
    };

    match result {
        Ok(count) => {
            tracing::info!(action = action.as_str(), count, "counter request served");
            json_response(200, &CountBody { count })
        }
        Err(error) => {
            tracing::error!(
                action = action.as_str(),
                error_category = %error.category(),
                detail = error.detail(),
                "counter request failed"
            );
            error_response(&error)
        }
    }
}

fn error_response(error: &CounterStoreError) -> ApiGatewayResponse {
    json_response(500, &ErrorBody::new(error.category(), error.detail()))
}

fn json_response(status_code: u16, payload: &impl Serialize) -> ApiGatewayResponse {
    let body = match serde_json::to_string(payload) {
        Ok(body) => body,
        Err(error) => {
            return ApiGatewayResponse {
                status_code: 500,
                headers: json_headers(),
                body: json!({
                    "error": ErrorCategory::Unhandled.as_str(),
                    "detail": format!("failed to serialize response body: {error}"),
                })
                .to_string(),
            };
        }
    };

    ApiGatewayResponse {
        status_code,
        headers: json_headers(),
        body,
    }
}

fn json_headers() -> Value {
    json!({"Content-Type": "application/json"})
}
