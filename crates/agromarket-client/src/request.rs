//! Mutation request description.
//!
//! A [`MutationRequest`] is built once at user-action time and never changed
//! afterwards: builder methods consume `self`, and there are no setters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::csrf::{CsrfToken, CSRF_HEADER};

/// Unique mutation identifier (UUID v4 newtype), used to correlate log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationId(pub Uuid);

impl MutationId {
    pub fn new() -> Self {
        MutationId(Uuid::new_v4())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MutationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request body, tagged with how it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `application/json` object body.
    Json(serde_json::Map<String, serde_json::Value>),
    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` text fields, in order.
    Multipart(Vec<(String, String)>),
}

impl Payload {
    /// Builds a JSON payload from a `json!({...})` object literal.
    ///
    /// Non-object values are wrapped as `{"value": ...}` so the body is always
    /// a mapping of field name to value.
    pub fn json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Payload::Json(map),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                Payload::Json(map)
            }
        }
    }

    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn multipart<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Multipart(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Looks up a top-level field by name, whatever the encoding.
    pub fn field(&self, name: &str) -> Option<String> {
        match self {
            Payload::Json(map) => map.get(name).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            Payload::Form(fields) | Payload::Multipart(fields) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
        }
    }
}

/// One mutating call to a backend endpoint. Every marketplace mutation is a
/// `POST`.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    id: MutationId,
    endpoint: String,
    payload: Payload,
    headers: BTreeMap<String, String>,
}

impl MutationRequest {
    pub fn post(endpoint: impl Into<String>, payload: Payload) -> Self {
        MutationRequest {
            id: MutationId::new(),
            endpoint: endpoint.into(),
            payload,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches the anti-forgery token header.
    pub fn with_csrf_token(self, token: &CsrfToken) -> Self {
        self.with_header(CSRF_HEADER, token.as_str())
    }

    pub fn id(&self) -> MutationId {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csrf_header_attached() {
        let req = MutationRequest::post("/cart/remove-item/", Payload::json(json!({"item_id": "7"})))
            .with_csrf_token(&CsrfToken::new("abc"));
        assert_eq!(req.header("x-csrftoken"), Some("abc"));
        assert_eq!(req.endpoint(), "/cart/remove-item/");
    }

    #[test]
    fn payload_field_lookup() {
        let json = Payload::json(json!({"item_id": "7", "quantity": 5}));
        assert_eq!(json.field("item_id").as_deref(), Some("7"));
        assert_eq!(json.field("quantity").as_deref(), Some("5"));
        assert_eq!(json.field("missing"), None);

        let form = Payload::form([("user_id", "42")]);
        assert_eq!(form.field("user_id").as_deref(), Some("42"));
    }

    #[test]
    fn non_object_json_is_wrapped() {
        match Payload::json(json!(3)) {
            Payload::Json(map) => assert_eq!(map.get("value"), Some(&json!(3))),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn each_request_gets_a_fresh_id() {
        let a = MutationRequest::post("/x/", Payload::form::<&str, &str>([]));
        let b = MutationRequest::post("/x/", Payload::form::<&str, &str>([]));
        assert_ne!(a.id(), b.id());
    }
}
