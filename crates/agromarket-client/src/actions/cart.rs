//! Cart page: quantity changes, item removal, and coupons.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::client::MarketplaceClient;
use crate::controller::{Mutation, MutationOutcome, Notices};
use crate::effects::{NotificationKind, UiEffects};
use crate::error::{ActionError, DispatchError};
use crate::inflight::TargetKey;
use crate::request::Payload;
use crate::transport::Transport;
use crate::validate::clamp_quantity;

pub const UPDATE_QUANTITY_ENDPOINT: &str = "/cart/update-quantity/";
pub const REMOVE_ITEM_ENDPOINT: &str = "/cart/remove-item/";
pub const APPLY_COUPON_ENDPOINT: &str = "/cart/apply-coupon/";

const DEFAULT_MIN_QUANTITY: u32 = 1;
const DEFAULT_MAX_QUANTITY: u32 = 999;

/// A money amount as the backend renders it (e.g. `"25.00"`).
///
/// Accepts JSON strings as-is and formats JSON numbers with two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Money(String);

impl Money {
    pub fn new(amount: impl Into<String>) -> Self {
        Money(amount.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Money(text),
            Raw::Number(n) => Money(format!("{:.2}", n)),
        })
    }
}

/// Recalculated cart totals returned by every cart endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    #[serde(default = "zero")]
    pub discount: Money,
    pub total: Money,
    pub total_items: u32,
}

fn zero() -> Money {
    Money::new("0.00")
}

/// Success state of `update-quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuantityUpdated {
    pub item_total: Money,
    pub cart_summary: CartSummary,
}

/// Success state of `remove-item` and `apply-coupon`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryUpdated {
    pub cart_summary: CartSummary,
}

/// Display state of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    Visible,
    /// Dimmed while its removal is in flight.
    Removing,
    /// Faded out and detached.
    Removed,
}

/// One cart line as rendered on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartRow {
    pub item_id: String,
    /// Value of the quantity input.
    pub quantity: u32,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub input_enabled: bool,
    /// Text of the line total, e.g. `$25.00`.
    pub item_total: String,
    pub state: RowState,
}

impl CartRow {
    pub fn new(item_id: impl Into<String>, quantity: u32, item_total: &Money) -> Self {
        CartRow {
            item_id: item_id.into(),
            quantity,
            min_quantity: DEFAULT_MIN_QUANTITY,
            max_quantity: DEFAULT_MAX_QUANTITY,
            input_enabled: true,
            item_total: format!("${}", item_total),
            state: RowState::Visible,
        }
    }

    pub fn with_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }
}

/// Texts of the order summary panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub item_count: String,
}

/// The cart page's mutable UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartPage {
    pub rows: Vec<CartRow>,
    pub summary: SummaryView,
    /// Cart badge in the site header.
    pub header_count: String,
    pub coupon_input: String,
    pub coupon_enabled: bool,
    /// Item awaiting confirmation in the remove dialog.
    pub pending_removal: Option<String>,
    /// Set when the page should reload after this delay.
    #[serde(with = "reload_millis")]
    pub reload_after: Option<Duration>,
}

impl CartPage {
    pub fn new(rows: Vec<CartRow>, summary: &CartSummary) -> Self {
        let mut page = CartPage {
            rows,
            coupon_enabled: true,
            ..CartPage::default()
        };
        page.apply_summary(summary);
        page
    }

    pub fn row(&self, item_id: &str) -> Option<&CartRow> {
        self.rows.iter().find(|row| row.item_id == item_id)
    }

    pub fn row_mut(&mut self, item_id: &str) -> Option<&mut CartRow> {
        self.rows.iter_mut().find(|row| row.item_id == item_id)
    }

    /// Writes authoritative totals into the summary panel and header badge.
    pub fn apply_summary(&mut self, summary: &CartSummary) {
        self.summary = SummaryView {
            subtotal: format!("${}", summary.subtotal),
            shipping: format!("${}", summary.shipping),
            tax: format!("${}", summary.tax),
            discount: format!("-${}", summary.discount),
            total: format!("${}", summary.total),
            item_count: summary.total_items.to_string(),
        };
        self.header_count = summary.total_items.to_string();
    }
}

mod reload_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(delay) => s.serialize_some(&(delay.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }
}

fn item_target(item_id: &str) -> TargetKey {
    TargetKey::scoped("cart-item", item_id)
}

impl<T: Transport, E: UiEffects> MarketplaceClient<T, E> {
    /// Changes a line's quantity.
    ///
    /// The input shows the new value and is disabled until the server
    /// answers; on failure it returns to the last confirmed quantity. A
    /// quantity below one opens the removal confirmation instead.
    pub async fn update_quantity(
        &self,
        page: &RefCell<CartPage>,
        item_id: &str,
        quantity: i64,
    ) -> Result<MutationOutcome<QuantityUpdated>, ActionError> {
        let (previous, quantity) = {
            let mut page = page.borrow_mut();
            let (current, min, max) = page
                .row(item_id)
                .map(|row| (row.quantity, row.min_quantity, row.max_quantity))
                .ok_or_else(|| ActionError::UnknownTarget(item_target(item_id).to_string()))?;
            if quantity < 1 {
                page.pending_removal = Some(item_id.to_string());
                return Err(ActionError::ConfirmRemoval {
                    item_id: item_id.to_string(),
                });
            }
            (current, clamp_quantity(&quantity.to_string(), min, max))
        };

        let request = self.post(
            UPDATE_QUANTITY_ENDPOINT,
            Payload::json(json!({ "item_id": item_id, "quantity": quantity })),
        );
        let mut mutation = Mutation::new(
            request,
            item_target(item_id),
            Notices::fixed("Cart updated successfully!", "Failed to update cart"),
        );

        let outcome = self
            .controller()
            .perform(
                &mut mutation,
                || {
                    if let Some(row) = page.borrow_mut().row_mut(item_id) {
                        row.quantity = quantity;
                        row.input_enabled = false;
                    }
                },
                |update: &QuantityUpdated| {
                    let mut page = page.borrow_mut();
                    if let Some(row) = page.row_mut(item_id) {
                        row.item_total = format!("${}", update.item_total);
                        row.input_enabled = true;
                    }
                    page.apply_summary(&update.cart_summary);
                },
                |_reason| {
                    if let Some(row) = page.borrow_mut().row_mut(item_id) {
                        row.quantity = previous;
                        row.input_enabled = true;
                    }
                },
            )
            .await?;
        Ok(outcome)
    }

    /// Removes a line. The row dims while the request is in flight and fades
    /// out on success; removing the last item schedules a page reload.
    pub async fn remove_item(
        &self,
        page: &RefCell<CartPage>,
        item_id: &str,
    ) -> Result<MutationOutcome<SummaryUpdated>, ActionError> {
        let previous_state = page
            .borrow()
            .row(item_id)
            .map(|row| row.state)
            .ok_or_else(|| ActionError::UnknownTarget(item_target(item_id).to_string()))?;

        let request = self.post(REMOVE_ITEM_ENDPOINT, Payload::json(json!({ "item_id": item_id })));
        let mut mutation = Mutation::new(
            request,
            item_target(item_id),
            Notices::fixed("Item removed from cart", "Failed to remove item"),
        );
        let reload_delay = self.reload_delay();

        let outcome = self
            .controller()
            .perform(
                &mut mutation,
                || {
                    if let Some(row) = page.borrow_mut().row_mut(item_id) {
                        row.state = RowState::Removing;
                    }
                },
                |update: &SummaryUpdated| {
                    let mut page = page.borrow_mut();
                    if let Some(row) = page.row_mut(item_id) {
                        row.state = RowState::Removed;
                    }
                    page.apply_summary(&update.cart_summary);
                    if update.cart_summary.total_items == 0 {
                        page.reload_after = Some(reload_delay);
                    }
                },
                |_reason| {
                    if let Some(row) = page.borrow_mut().row_mut(item_id) {
                        row.state = previous_state;
                    }
                },
            )
            .await?;
        Ok(outcome)
    }

    /// Confirms the removal dialog, removing the item it was opened for.
    ///
    /// Returns `None` when no removal was pending. If the item is busy the
    /// removal stays pending so the dialog can be confirmed again.
    pub async fn confirm_removal(
        &self,
        page: &RefCell<CartPage>,
    ) -> Option<Result<MutationOutcome<SummaryUpdated>, ActionError>> {
        let item_id = page.borrow_mut().pending_removal.take()?;
        let result = self.remove_item(page, &item_id).await;
        if let Err(ActionError::Dispatch(DispatchError::TargetBusy { .. })) = result {
            page.borrow_mut().pending_removal = Some(item_id);
        }
        Some(result)
    }

    /// Dismisses the removal dialog.
    pub fn cancel_removal(&self, page: &RefCell<CartPage>) {
        page.borrow_mut().pending_removal = None;
    }

    /// Applies the code typed into the coupon input.
    ///
    /// The input is disabled while the request is in flight and cleared once
    /// the server accepts the code.
    pub async fn apply_coupon(
        &self,
        page: &RefCell<CartPage>,
    ) -> Result<MutationOutcome<SummaryUpdated>, ActionError> {
        let code = page.borrow().coupon_input.trim().to_string();
        if code.is_empty() {
            let message = "Please enter a coupon code";
            self.effects().show_notification(message, NotificationKind::Error);
            return Err(ActionError::Validation(message.to_string()));
        }

        let previous_enabled = page.borrow().coupon_enabled;
        let request = self.post(APPLY_COUPON_ENDPOINT, Payload::json(json!({ "coupon_code": code })));
        let mut mutation = Mutation::new(
            request,
            TargetKey::new("coupon"),
            Notices::from_server("Coupon applied", "Invalid coupon code"),
        );

        let outcome = self
            .controller()
            .perform(
                &mut mutation,
                || page.borrow_mut().coupon_enabled = false,
                |update: &SummaryUpdated| {
                    let mut page = page.borrow_mut();
                    page.apply_summary(&update.cart_summary);
                    page.coupon_input.clear();
                    page.coupon_enabled = true;
                },
                |_reason| page.borrow_mut().coupon_enabled = previous_enabled,
            )
            .await?;
        Ok(outcome)
    }
}
