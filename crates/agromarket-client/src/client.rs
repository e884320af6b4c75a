//! Page-level entry point tying configuration, transport, and effects together.
//!
//! [`MarketplaceClient`] owns the [`MutationController`] shared by every call
//! site on a page and stamps each request with the session's anti-forgery
//! token. The call-site actions in [`crate::actions`] are methods on it.

use std::time::Duration;

use crate::config::ClientConfig;
use crate::controller::MutationController;
use crate::csrf::CsrfToken;
use crate::effects::UiEffects;
use crate::error::ClientError;
use crate::request::{MutationRequest, Payload};
use crate::transport::{HttpTransport, Transport};

pub struct MarketplaceClient<T, E> {
    controller: MutationController<T, E>,
    csrf_token: CsrfToken,
    reload_delay: Duration,
}

impl<E: UiEffects> MarketplaceClient<HttpTransport, E> {
    /// Builds an HTTP-backed client. Fails when the base URL is invalid or no
    /// anti-forgery token is configured.
    pub fn from_config(config: &ClientConfig, effects: E) -> Result<Self, ClientError> {
        let csrf_token = config.require_csrf_token()?.clone();
        let transport = HttpTransport::new(config)?;
        Ok(MarketplaceClient::new(transport, effects, csrf_token, config.reload_delay))
    }
}

impl<T: Transport, E: UiEffects> MarketplaceClient<T, E> {
    pub fn new(transport: T, effects: E, csrf_token: CsrfToken, reload_delay: Duration) -> Self {
        MarketplaceClient {
            controller: MutationController::new(transport, effects),
            csrf_token,
            reload_delay,
        }
    }

    pub fn controller(&self) -> &MutationController<T, E> {
        &self.controller
    }

    pub fn effects(&self) -> &E {
        self.controller.effects()
    }

    pub fn reload_delay(&self) -> Duration {
        self.reload_delay
    }

    /// A `POST` to `endpoint` carrying the anti-forgery token.
    pub(crate) fn post(&self, endpoint: &str, payload: Payload) -> MutationRequest {
        MutationRequest::post(endpoint, payload).with_csrf_token(&self.csrf_token)
    }
}
