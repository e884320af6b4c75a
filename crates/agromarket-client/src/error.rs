//! Error types for the marketplace client.
//!
//! Errors are split by when they can happen:
//! - [`ClientError`] at setup time (configuration, HTTP client construction),
//! - [`TransportError`] and [`MutationFailure`] while a mutation resolves,
//! - [`DispatchError`] when the controller refuses to start a mutation,
//! - [`ActionError`] for call-site checks that run before any request.

use crate::controller::MutationState;
use crate::inflight::TargetKey;

/// Message shown to the user for every transport-level failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Setup-time errors. These are returned from constructors and never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed.
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A mutating request was configured without an anti-forgery token.
    #[error("missing csrf token: set AGROMARKET_CSRF_TOKEN or provide a csrftoken cookie")]
    MissingCsrfToken,

    /// The underlying HTTP client could not be built.
    #[error("http client construction failed: {0}")]
    HttpClient(String),
}

/// A request that could not complete, or whose response could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent, or the response body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// A non-success HTTP status whose body is not a response envelope.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body is not a valid response envelope, or its state payload does
    /// not have the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Why a mutation was rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationFailure {
    /// The endpoint answered `success: false`.
    #[error("server rejected mutation: {}", message.as_deref().unwrap_or("<no message>"))]
    ServerRejection { message: Option<String> },

    /// The request never produced an interpretable answer.
    #[error("transport failure: {0}")]
    TransportFailure(#[from] TransportError),
}

impl MutationFailure {
    /// The single line shown to the user.
    ///
    /// Rejections show the server's message, or `fallback` when it sent none.
    /// Transport failures always show [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            MutationFailure::ServerRejection { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
            MutationFailure::TransportFailure(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// The controller refused to start a mutation. No callback ran and no
/// notification was shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Another mutation on the same target has not resolved yet.
    #[error("target {target} already has a mutation in flight")]
    TargetBusy { target: TargetKey },

    /// The mutation was already dispatched once; terminal mutations are inert.
    #[error("mutation already dispatched ({state:?})")]
    AlreadyDispatched { state: MutationState },
}

/// Errors raised by call-site actions before or instead of dispatching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Client-side validation failed. An error notification was shown.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A quantity below one was entered; the host should ask the user to
    /// confirm removing the item instead.
    #[error("removal of item {item_id} needs confirmation")]
    ConfirmRemoval { item_id: String },

    /// The page has no element for the requested target.
    #[error("unknown ui target: {0}")]
    UnknownTarget(String),

    /// The controller refused the mutation.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
