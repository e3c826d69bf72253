//! Response envelope validation
//!
//! Every dashboard endpoint answers with the same JSON envelope:
//!
//! ```json
//! { "E_IFRESULT": "Z:Success", "E_IFFAILMSG": "...", "RESPONSE_STRING": { ... } }
//! ```

use serde_json::Value;

use crate::error::{BlueLinkError, Result};

/// Result code field
pub const RESULT_FIELD: &str = "E_IFRESULT";
/// Failure message field
pub const FAIL_MESSAGE_FIELD: &str = "E_IFFAILMSG";
/// Nested payload field
pub const PAYLOAD_FIELD: &str = "RESPONSE_STRING";
/// Result code the service uses for success
pub const SUCCESS: &str = "Z:Success";

/// Failure message the service returns while an earlier command is in flight
const PENDING_MESSAGE: &str = "Bad Gateway";

/// Validate a raw response and return the parsed envelope.
pub fn validate(status: u16, body: &str, action: &str) -> Result<Value> {
    if status != 200 {
        return Err(BlueLinkError::Status {
            action: action.to_string(),
            status,
        });
    }

    let json: Value =
        serde_json::from_str(body).map_err(|_| BlueLinkError::MalformedResponse {
            action: action.to_string(),
            body: body.to_string(),
        })?;

    if json.get(RESULT_FIELD).and_then(Value::as_str) != Some(SUCCESS) {
        let message = match json.get(FAIL_MESSAGE_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown error".to_string(),
            Some(other) => other.to_string(),
        };

        if message == PENDING_MESSAGE {
            return Err(BlueLinkError::RequestPending);
        }
        return Err(BlueLinkError::Remote {
            action: action.to_string(),
            message,
        });
    }

    Ok(json)
}

/// Get the nested `RESPONSE_STRING` payload of a validated envelope.
pub fn response_string<'a>(envelope: &'a Value, action: &str) -> Result<&'a Value> {
    field(envelope, PAYLOAD_FIELD, action)
}

/// Get a required field of a JSON object.
pub fn field<'a>(value: &'a Value, name: &str, action: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| BlueLinkError::unexpected(action, format!("missing field `{}`", name)))
}

/// Get a required string field of a JSON object.
pub fn str_field<'a>(value: &'a Value, name: &str, action: &str) -> Result<&'a str> {
    field(value, name, action)?
        .as_str()
        .ok_or_else(|| BlueLinkError::unexpected(action, format!("field `{}` is not a string", name)))
}
