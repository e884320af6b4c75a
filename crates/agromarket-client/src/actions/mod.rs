//! Call sites of the mutation controller.
//!
//! Each action is a method on [`MarketplaceClient`](crate::MarketplaceClient)
//! that builds its request, names its UI target, and passes the apply,
//! reconcile, and rollback closures for its view model. View models are
//! borrowed through `RefCell`: the page runs on a single logical thread and
//! the closures never hold a borrow across an await point.

pub mod cart;
pub mod contact;
pub mod follow;

pub use cart::{CartPage, CartRow, CartSummary, Money, QuantityUpdated, RowState, SummaryUpdated};
pub use contact::{ContactForm, FormField};
pub use follow::{FollowButton, FollowToggled};
