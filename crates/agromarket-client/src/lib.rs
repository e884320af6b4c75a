//! Optimistic mutation client for the AgroMarket marketplace.
//!
//! Every user action that changes server state goes through the same cycle:
//! the UI changes immediately, the request is sent, and the UI is then
//! reconciled with the server's answer or rolled back. This crate provides
//! the controller for that cycle, the HTTP transport, the injected UI effects
//! interface, and the cart, follow, and contact call sites built on them.

pub mod actions;
pub mod client;
pub mod config;
pub mod controller;
pub mod csrf;
pub mod debounce;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod inflight;
pub mod request;
pub mod transport;
pub mod validate;

pub use client::MarketplaceClient;
pub use config::ClientConfig;
pub use controller::{Mutation, MutationController, MutationOutcome, MutationState, Notices};
pub use csrf::CsrfToken;
pub use effects::{NotificationKind, RecordingEffects, TracingEffects, UiEffects};
pub use envelope::{ServerState, TransportResponse};
pub use error::{ActionError, ClientError, DispatchError, MutationFailure, TransportError};
pub use inflight::TargetKey;
pub use request::{MutationId, MutationRequest, Payload};
pub use transport::{HttpTransport, Transport};
