//! Optimistic mutation controller.
//!
//! [`MutationController::perform`] applies a local UI change immediately,
//! sends the request, then reconciles the UI with the server's answer or
//! rolls the change back. Call sites differ only in the request they build
//! and the closures they pass; the orchestration lives here.
//!
//! Lifecycle of a [`Mutation`]:
//!
//! ```text
//! Idle -> Applied -> Reconciled
//!                 \-> RolledBack
//! ```
//!
//! `Applied` is entered synchronously before the request is sent. Terminal
//! mutations are inert: performing them again has no effect.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::effects::{LoadingGuard, NotificationKind, UiEffects};
use crate::envelope::{interpret, ServerState};
use crate::error::{DispatchError, MutationFailure, TransportError};
use crate::inflight::{InFlightRegistry, TargetKey};
use crate::request::{MutationId, MutationRequest};
use crate::transport::Transport;

/// Where a mutation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    Idle,
    Applied,
    Reconciled,
    RolledBack,
}

impl MutationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MutationState::Reconciled | MutationState::RolledBack)
    }
}

/// How a mutation resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<S = ServerState> {
    /// The endpoint accepted the mutation and returned its authoritative state.
    Success(S),
    /// The endpoint refused; carries the message shown to the user.
    Rejected(String),
    /// The request failed or the answer could not be understood.
    NetworkError(TransportError),
}

impl<S> MutationOutcome<S> {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success(_))
    }
}

/// Text of the success notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessNotice {
    /// Always this text.
    Fixed(String),
    /// The envelope's `message`, or `fallback` when it has none.
    FromServer { fallback: String },
}

/// Notification texts for one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notices {
    pub success: SuccessNotice,
    /// Shown when a rejection carries no message of its own.
    pub rejection_fallback: String,
}

impl Notices {
    pub fn fixed(success: impl Into<String>, rejection_fallback: impl Into<String>) -> Self {
        Notices {
            success: SuccessNotice::Fixed(success.into()),
            rejection_fallback: rejection_fallback.into(),
        }
    }

    pub fn from_server(
        success_fallback: impl Into<String>,
        rejection_fallback: impl Into<String>,
    ) -> Self {
        Notices {
            success: SuccessNotice::FromServer {
                fallback: success_fallback.into(),
            },
            rejection_fallback: rejection_fallback.into(),
        }
    }

    fn success_text(&self, server_message: Option<&str>) -> String {
        match &self.success {
            SuccessNotice::Fixed(text) => text.clone(),
            SuccessNotice::FromServer { fallback } => server_message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
        }
    }
}

/// One user action: the request, the UI target it touches, and its lifecycle.
#[derive(Debug, Clone)]
pub struct Mutation {
    request: MutationRequest,
    target: TargetKey,
    notices: Notices,
    state: MutationState,
}

impl Mutation {
    pub fn new(request: MutationRequest, target: TargetKey, notices: Notices) -> Self {
        Mutation {
            request,
            target,
            notices,
            state: MutationState::Idle,
        }
    }

    pub fn id(&self) -> MutationId {
        self.request.id()
    }

    pub fn request(&self) -> &MutationRequest {
        &self.request
    }

    pub fn target(&self) -> &TargetKey {
        &self.target
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn state(&self) -> MutationState {
        self.state
    }
}

/// Runs mutations against a [`Transport`], reporting through [`UiEffects`].
///
/// Holds the per-target in-flight registry, so one controller should serve
/// every call site on a page.
pub struct MutationController<T, E> {
    transport: T,
    effects: E,
    in_flight: InFlightRegistry,
}

impl<T: Transport, E: UiEffects> MutationController<T, E> {
    pub fn new(transport: T, effects: E) -> Self {
        MutationController {
            transport,
            effects,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Performs `mutation` optimistically.
    ///
    /// `apply` runs before this returns its first `Pending`. Exactly one of
    /// `on_success` or `on_rollback` runs once the request resolves, followed
    /// by exactly one notification. The loading indicator is visible while the
    /// request is outstanding and hidden on every exit path.
    ///
    /// Refused without side effects when the mutation is not `Idle` or its
    /// target already has a mutation in flight.
    pub async fn perform<S, A, F, R>(
        &self,
        mutation: &mut Mutation,
        apply: A,
        on_success: F,
        on_rollback: R,
    ) -> Result<MutationOutcome<S>, DispatchError>
    where
        S: DeserializeOwned,
        A: FnOnce(),
        F: FnOnce(&S),
        R: FnOnce(&str),
    {
        let id = mutation.id();

        if mutation.state != MutationState::Idle {
            tracing::debug!(mutation_id = %id, state = ?mutation.state, "mutation already dispatched");
            return Err(DispatchError::AlreadyDispatched {
                state: mutation.state,
            });
        }

        let claim = self
            .in_flight
            .try_claim(&mutation.target, id)
            .map_err(|holder| {
                tracing::warn!(
                    mutation_id = %id,
                    ui_target = %mutation.target,
                    holder = %holder.mutation_id,
                    held_ms = holder.started_at.elapsed().as_millis() as u64,
                    "target busy, mutation refused"
                );
                DispatchError::TargetBusy {
                    target: mutation.target.clone(),
                }
            })?;

        apply();
        mutation.state = MutationState::Applied;
        tracing::debug!(
            mutation_id = %id,
            ui_target = %claim.target(),
            endpoint = mutation.request.endpoint(),
            "optimistic change applied, dispatching"
        );

        let result = {
            let _loading = LoadingGuard::show(&self.effects);
            match self.transport.send(&mutation.request).await {
                Ok(response) => interpret::<S>(&response),
                Err(err) => Err(MutationFailure::TransportFailure(err)),
            }
        };

        let outcome = match result {
            Ok(accepted) => {
                on_success(&accepted.state);
                let text = mutation.notices.success_text(accepted.message.as_deref());
                self.effects.show_notification(&text, NotificationKind::Success);
                mutation.state = MutationState::Reconciled;
                tracing::info!(mutation_id = %id, ui_target = %mutation.target, "mutation reconciled");
                MutationOutcome::Success(accepted.state)
            }
            Err(failure) => {
                let message = failure.user_message(&mutation.notices.rejection_fallback);
                match &failure {
                    MutationFailure::ServerRejection { .. } => tracing::warn!(
                        mutation_id = %id,
                        ui_target = %mutation.target,
                        reason = %message,
                        "server rejected mutation, rolling back"
                    ),
                    MutationFailure::TransportFailure(err) => tracing::error!(
                        mutation_id = %id,
                        ui_target = %mutation.target,
                        endpoint = mutation.request.endpoint(),
                        error = %err,
                        "transport failure, rolling back"
                    ),
                }
                on_rollback(&message);
                self.effects.show_notification(&message, NotificationKind::Error);
                mutation.state = MutationState::RolledBack;
                match failure {
                    MutationFailure::ServerRejection { .. } => MutationOutcome::Rejected(message),
                    MutationFailure::TransportFailure(err) => MutationOutcome::NetworkError(err),
                }
            }
        };

        drop(claim);
        Ok(outcome)
    }
}
