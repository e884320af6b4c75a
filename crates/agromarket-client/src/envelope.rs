//! Response envelope interpretation.
//!
//! Every endpoint answers with a JSON object carrying a boolean `success`
//! flag. On success the rest of the object is the authoritative state; on
//! failure it carries a human-readable `message` (some endpoints use `error`
//! instead). The HTTP status is not trusted to mean anything on its own: the
//! backend reports rejections with 400 and 500 bodies that are still valid
//! envelopes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MutationFailure, TransportError};

/// Opaque authoritative state returned by an endpoint.
pub type ServerState = serde_json::Map<String, Value>;

/// Longest body excerpt kept in a [`TransportError::Status`].
const BODY_EXCERPT_LEN: usize = 200;

/// Raw answer from a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }

    /// Convenience for building a JSON response, mostly from tests.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A successful envelope decoded into the call site's state type.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<S> {
    pub state: S,
    /// The envelope's `message`, if any.
    pub message: Option<String>,
}

/// Interprets a raw response.
///
/// `Ok` only for `success: true` with a state that decodes into `S`;
/// anything else is a [`MutationFailure`].
pub fn interpret<S: DeserializeOwned>(
    response: &TransportResponse,
) -> Result<Accepted<S>, MutationFailure> {
    let mut object = match parse_envelope(response) {
        Some(object) => object,
        None => return Err(unreadable(response).into()),
    };

    let success = match object.remove("success") {
        Some(Value::Bool(flag)) => flag,
        _ => return Err(unreadable(response).into()),
    };

    let message = string_field(&object, "message");

    if !success {
        return Err(MutationFailure::ServerRejection {
            message: message.or_else(|| string_field(&object, "error")),
        });
    }

    let state = serde_json::from_value::<S>(Value::Object(object))
        .map_err(|err| TransportError::Decode(format!("state payload: {}", err)))?;

    Ok(Accepted { state, message })
}

fn parse_envelope(response: &TransportResponse) -> Option<serde_json::Map<String, Value>> {
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn unreadable(response: &TransportResponse) -> TransportError {
    if response.is_success_status() {
        TransportError::Decode("body is not a response envelope".to_string())
    } else {
        let body = String::from_utf8_lossy(&response.body);
        TransportError::Status {
            status: response.status,
            body: body.chars().take(BODY_EXCERPT_LEN).collect(),
        }
    }
}

fn string_field(object: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    object.get(name).and_then(Value::as_str).map(str::to_string)
}
