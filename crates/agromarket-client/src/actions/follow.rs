//! Profile page follow button.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::client::MarketplaceClient;
use crate::controller::{Mutation, MutationOutcome, Notices};
use crate::effects::UiEffects;
use crate::error::ActionError;
use crate::inflight::TargetKey;
use crate::request::Payload;
use crate::transport::Transport;

pub const TOGGLE_FOLLOW_ENDPOINT: &str = "/users/toggle-follow/";

/// Success state of `toggle-follow`. When the backend reports the resulting
/// relationship it wins over the optimistic guess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FollowToggled {
    #[serde(default)]
    pub following: Option<bool>,
    #[serde(default)]
    pub followers_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowButton {
    pub user_id: String,
    pub following: bool,
    pub label: String,
}

impl FollowButton {
    pub fn new(user_id: impl Into<String>, following: bool) -> Self {
        let mut button = FollowButton {
            user_id: user_id.into(),
            following,
            label: String::new(),
        };
        button.set_following(following);
        button
    }

    pub fn set_following(&mut self, following: bool) {
        self.following = following;
        self.label = if following { "Following" } else { "Follow" }.to_string();
    }
}

impl<T: Transport, E: UiEffects> MarketplaceClient<T, E> {
    /// Flips the follow button immediately and flips it back if the server
    /// does not confirm. A confirmed toggle takes the server's `following`.
    pub async fn toggle_follow(
        &self,
        button: &RefCell<FollowButton>,
    ) -> Result<MutationOutcome<FollowToggled>, ActionError> {
        let (user_id, was_following) = {
            let button = button.borrow();
            (button.user_id.clone(), button.following)
        };

        let request = self.post(
            TOGGLE_FOLLOW_ENDPOINT,
            Payload::form([("user_id", user_id.as_str())]),
        );
        let mut mutation = Mutation::new(
            request,
            TargetKey::scoped("follow", &user_id),
            Notices::from_server("Follow status updated", "Failed to update follow status"),
        );

        let outcome = self
            .controller()
            .perform(
                &mut mutation,
                || button.borrow_mut().set_following(!was_following),
                |state: &FollowToggled| {
                    if let Some(following) = state.following {
                        button.borrow_mut().set_following(following);
                    }
                },
                |_reason| button.borrow_mut().set_following(was_following),
            )
            .await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_tracks_state() {
        let mut button = FollowButton::new("7", false);
        assert_eq!(button.label, "Follow");
        button.set_following(true);
        assert_eq!(button.label, "Following");
    }

    #[test]
    fn toggled_state_is_optional() {
        let state: FollowToggled = serde_json::from_value(serde_json::json!({"message": "ok"})).unwrap();
        assert_eq!(state, FollowToggled::default());
    }
}
