//! Wire format for resource actions.
//!
//! The literal JSON shapes exchanged with a string-keyed store must be
//! reproduced exactly for compatibility:
//!
//! ```json
//! { "type": "USERS_REQUESTED", "url": "/api/users",
//!   "params": {}, "data": {}, "extraPayload": {} }
//! { "type": "USERS_RECEIVED", "successResponse": { … }, "rootAction": { … } }
//! { "type": "USERS_FAILED", "errorResponse": { "response": { … } }, "rootAction": { … } }
//! { "type": "USERS_RESET" }
//! { "type": "USERS_UPDATE", "payload": { … } }
//! { "type": "USERS_DELETE", "payload": { … } }
//! ```
//!
//! Inside this crate actions are a tagged union; the `type` string with its
//! interpolated prefix exists only at this boundary.

use crate::request::{HttpResponse, RequestError};
use crate::resource::ResourceAction;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Errors decoding a wire-format action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The value is not a JSON object
    #[error("wire action must be a JSON object")]
    NotAnObject,

    /// The `type` tag is missing, not a string, or carries an unknown
    /// prefix/suffix
    #[error("unrecognized action type {found:?} for prefix {prefix:?}")]
    UnknownType {
        /// The prefix decoding was attempted with
        prefix: String,
        /// The offending type tag (empty when absent)
        found: String,
    },

    /// A required field is missing or has the wrong shape
    #[error("missing or invalid field {0:?}")]
    InvalidField(&'static str),
}

impl ResourceAction {
    /// The wire suffix for this action kind
    #[must_use]
    pub const fn type_suffix(&self) -> &'static str {
        match self {
            Self::Requested { .. } => "REQUESTED",
            Self::Received { .. } => "RECEIVED",
            Self::Failed { .. } => "FAILED",
            Self::Reset => "RESET",
            Self::Update { .. } => "UPDATE",
            Self::Delete { .. } => "DELETE",
        }
    }

    /// The interpolated wire type tag, e.g. `"USERS_REQUESTED"`
    #[must_use]
    pub fn type_tag(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.type_suffix())
    }
}

fn encode_response(response: &HttpResponse) -> Value {
    let headers: Map<String, Value> = response
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();

    json!({
        "data": response.data,
        "headers": headers,
        "statusText": response.status_text,
        "status": response.status,
    })
}

/// Encode an action into its exact wire shape under the given prefix
#[must_use]
pub fn encode(action: &ResourceAction, prefix: &str) -> Value {
    let type_tag = action.type_tag(prefix);
    match action {
        ResourceAction::Requested {
            url,
            params,
            data,
            extra_payload,
        } => json!({
            "type": type_tag,
            "url": url,
            "params": params,
            "data": data,
            "extraPayload": extra_payload,
        }),
        ResourceAction::Received {
            success_response,
            root_action,
        } => json!({
            "type": type_tag,
            "successResponse": encode_response(success_response),
            "rootAction": encode(root_action, prefix),
        }),
        ResourceAction::Failed { error, root_action } => json!({
            "type": type_tag,
            "errorResponse": { "response": encode_response(&error.response) },
            "rootAction": encode(root_action, prefix),
        }),
        ResourceAction::Reset => json!({ "type": type_tag }),
        ResourceAction::Update { payload } | ResourceAction::Delete { payload } => json!({
            "type": type_tag,
            "payload": payload,
        }),
    }
}

fn decode_response(value: &Value) -> Result<HttpResponse, WireError> {
    let object = value.as_object().ok_or(WireError::NotAnObject)?;

    let headers = match object.get("headers") {
        None => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| {
                value
                    .as_str()
                    .map(|v| (name.clone(), v.to_string()))
                    .ok_or(WireError::InvalidField("headers"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(WireError::InvalidField("headers")),
    };

    let status = object
        .get("status")
        .and_then(Value::as_u64)
        .ok_or(WireError::InvalidField("status"))?;
    let status = u16::try_from(status).map_err(|_| WireError::InvalidField("status"))?;

    Ok(HttpResponse {
        data: object.get("data").cloned().unwrap_or(Value::Null),
        headers,
        status_text: object
            .get("statusText")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        status,
    })
}

fn field(object: &Map<String, Value>, name: &'static str) -> Result<Value, WireError> {
    object.get(name).cloned().ok_or(WireError::InvalidField(name))
}

/// Decode a wire-format action under the given prefix.
///
/// # Errors
///
/// - [`WireError::NotAnObject`] when the value is not a JSON object
/// - [`WireError::UnknownType`] when the `type` tag is absent or does not
///   match `<prefix>_<known suffix>`
/// - [`WireError::InvalidField`] when a required field is missing or
///   malformed
pub fn decode(value: &Value, prefix: &str) -> Result<ResourceAction, WireError> {
    let object = value.as_object().ok_or(WireError::NotAnObject)?;

    let type_tag = object.get("type").and_then(Value::as_str).unwrap_or("");
    let unknown = || WireError::UnknownType {
        prefix: prefix.to_string(),
        found: type_tag.to_string(),
    };
    let suffix = type_tag
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(unknown)?;

    match suffix {
        "REQUESTED" => Ok(ResourceAction::Requested {
            url: object
                .get("url")
                .and_then(Value::as_str)
                .ok_or(WireError::InvalidField("url"))?
                .to_string(),
            params: field(object, "params")?,
            data: field(object, "data")?,
            extra_payload: field(object, "extraPayload")?,
        }),
        "RECEIVED" => Ok(ResourceAction::Received {
            success_response: decode_response(&field(object, "successResponse")?)?,
            root_action: Box::new(decode(&field(object, "rootAction")?, prefix)?),
        }),
        "FAILED" => {
            let error_response = field(object, "errorResponse")?;
            let response = error_response
                .get("response")
                .ok_or(WireError::InvalidField("errorResponse"))?;
            Ok(ResourceAction::Failed {
                error: RequestError::new(decode_response(response)?),
                root_action: Box::new(decode(&field(object, "rootAction")?, prefix)?),
            })
        },
        "RESET" => Ok(ResourceAction::Reset),
        "UPDATE" => Ok(ResourceAction::Update {
            payload: field(object, "payload")?,
        }),
        "DELETE" => Ok(ResourceAction::Delete {
            payload: field(object, "payload")?,
        }),
        _ => Err(unknown()),
    }
}
