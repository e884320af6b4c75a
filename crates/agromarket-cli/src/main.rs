//! AgroMarket command-line client.
//!
//! Runs one optimistic mutation against a live marketplace backend using the
//! same call sites the pages use, then prints the resulting view model as
//! JSON. Notifications are logged to stderr.
//!
//! Configuration comes from `AGROMARKET_BASE_URL`, `AGROMARKET_CSRF_TOKEN`
//! and `AGROMARKET_COOKIE`; `--base-url` and `--csrf-token` override them.
//! Log verbosity follows `RUST_LOG`.

use std::cell::RefCell;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use agromarket_client::actions::{CartPage, CartRow, CartSummary, ContactForm, FollowButton, Money};
use agromarket_client::{
    ActionError, ClientConfig, CsrfToken, HttpTransport, MarketplaceClient, MutationOutcome,
    TracingEffects,
};

/// AgroMarket marketplace client.
#[derive(Parser)]
#[command(name = "agromarket", about = "Run marketplace actions from the terminal")]
struct Cli {
    /// Backend origin, e.g. http://127.0.0.1:8000.
    #[arg(long)]
    base_url: Option<String>,

    /// Anti-forgery token to send with every request.
    #[arg(long)]
    csrf_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Change the quantity of a cart line.
    UpdateQuantity {
        /// Cart item ID.
        #[arg(long)]
        item: String,

        /// Quantity currently in the cart (restored on failure).
        #[arg(long)]
        current: u32,

        /// New quantity. Values below 1 ask for removal instead.
        #[arg(long, allow_hyphen_values = true)]
        quantity: i64,
    },

    /// Remove a line from the cart.
    RemoveItem {
        /// Cart item ID.
        #[arg(long)]
        item: String,
    },

    /// Apply a coupon code to the cart.
    ApplyCoupon {
        /// Coupon code.
        #[arg(long)]
        code: String,
    },

    /// Follow or unfollow a user.
    Follow {
        /// User ID.
        #[arg(long)]
        user: String,

        /// Whether the user is currently followed (the command flips it).
        #[arg(long)]
        following: bool,
    },

    /// Send a message through a user's contact form.
    SendMessage {
        /// Recipient user ID.
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,

        /// Extra form fields as name=value.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = cli.csrf_token {
        config.csrf_token = Some(CsrfToken::new(token));
    }

    let client = match MarketplaceClient::from_config(&config, TracingEffects) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let exit_code = run(&client, cli.command).await;
    process::exit(exit_code);
}

/// Execute one subcommand.
///
/// Returns exit code: 0 = reconciled, 1 = rolled back,
/// 2 = refused before any request was sent.
async fn run(client: &MarketplaceClient<HttpTransport, TracingEffects>, command: Commands) -> i32 {
    match command {
        Commands::UpdateQuantity {
            item,
            current,
            quantity,
        } => {
            let page = cart_page(&item, current);
            let result = client.update_quantity(&page, &item, quantity).await;
            report(result, &page)
        }
        Commands::RemoveItem { item } => {
            let page = cart_page(&item, 1);
            let result = client.remove_item(&page, &item).await;
            report(result, &page)
        }
        Commands::ApplyCoupon { code } => {
            let page = cart_page("", 0);
            page.borrow_mut().coupon_input = code;
            let result = client.apply_coupon(&page).await;
            report(result, &page)
        }
        Commands::Follow { user, following } => {
            let button = RefCell::new(FollowButton::new(user, following));
            let result = client.toggle_follow(&button).await;
            report(result, &button)
        }
        Commands::SendMessage {
            to,
            subject,
            message,
            fields,
        } => {
            let mut form = ContactForm::new(to);
            form.open();
            form.set("subject", subject);
            form.set("message", message);
            for (name, value) in fields {
                form.set(&name, value);
            }
            let form = RefCell::new(form);
            let result = client.send_message(&form).await;
            report(result, &form)
        }
    }
}

/// A cart page holding just the line being acted on.
fn cart_page(item_id: &str, quantity: u32) -> RefCell<CartPage> {
    let zero = Money::new("0.00");
    let summary = CartSummary {
        subtotal: zero.clone(),
        shipping: zero.clone(),
        tax: zero.clone(),
        discount: zero.clone(),
        total: zero.clone(),
        total_items: quantity,
    };
    let rows = if item_id.is_empty() {
        Vec::new()
    } else {
        vec![CartRow::new(item_id, quantity, &zero)]
    };
    RefCell::new(CartPage::new(rows, &summary))
}

fn report<S, V: Serialize>(result: Result<MutationOutcome<S>, ActionError>, view: &RefCell<V>) -> i32 {
    let code = match result {
        Ok(MutationOutcome::Success(_)) => 0,
        Ok(MutationOutcome::Rejected(_)) | Ok(MutationOutcome::NetworkError(_)) => 1,
        Err(ActionError::ConfirmRemoval { item_id }) => {
            eprintln!("Quantity below 1: run `agromarket remove-item --item {}` to remove it", item_id);
            2
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    let json = serde_json::to_string_pretty(&*view.borrow())
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize view: {}\"}}", e));
    println!("{}", json);
    code
}

/// Parse a `name=value` form field.
fn parse_field(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("invalid field '{}', expected name=value", s))
}
