//! Client-side field validation and input formatting.
//!
//! Validation runs before a request is built, so obviously bad input never
//! reaches the controller. Messages are the ones shown next to the field.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("invalid phone regex"));

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("invalid username regex"));

static CARD_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s]{13,19}$").expect("invalid card number regex"));

static CARD_EXPIRY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("invalid expiry regex"));

static CARD_CVC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("invalid cvc regex"));

const USERNAME_MIN_LEN: usize = 3;
const CARD_NUMBER_MAX_LEN: usize = 19;

/// Largest accepted profile image upload.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// What kind of value a form field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Username,
    CardNumber,
    CardExpiry,
    CardCvc,
}

impl FieldKind {
    /// Infers the kind from a form field name, defaulting to [`FieldKind::Text`].
    pub fn from_field_name(name: &str) -> Self {
        match name {
            "email" | "shipping_email" | "billing_email" => FieldKind::Email,
            "phone" | "phone_number" => FieldKind::Phone,
            "username" => FieldKind::Username,
            "card_number" => FieldKind::CardNumber,
            "card_expiry" => FieldKind::CardExpiry,
            "card_cvc" => FieldKind::CardCvc,
            _ => FieldKind::Text,
        }
    }
}

/// Validates one field value. Surrounding whitespace is ignored.
///
/// An empty optional field is always valid; format rules apply only to
/// non-empty values.
pub fn validate_field(kind: FieldKind, raw: &str, required: bool) -> Result<(), String> {
    let value = raw.trim();

    if value.is_empty() {
        return if required {
            Err("This field is required.".to_string())
        } else {
            Ok(())
        };
    }

    let ok = match kind {
        FieldKind::Text => true,
        FieldKind::Email => EMAIL_REGEX.is_match(value),
        FieldKind::Phone => {
            let digits: String = value
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                .collect();
            PHONE_REGEX.is_match(&digits)
        }
        FieldKind::Username => {
            if value.chars().count() < USERNAME_MIN_LEN {
                return Err("Username must be at least 3 characters long.".to_string());
            }
            USERNAME_REGEX.is_match(value)
        }
        FieldKind::CardNumber => CARD_NUMBER_REGEX.is_match(value),
        FieldKind::CardExpiry => CARD_EXPIRY_REGEX.is_match(value),
        FieldKind::CardCvc => CARD_CVC_REGEX.is_match(value),
    };

    if ok {
        Ok(())
    } else {
        Err(invalid_message(kind).to_string())
    }
}

/// Validates a checkout field. Same rules as [`validate_field`]; the checkout
/// form words its messages without a closing period.
pub fn validate_checkout_field(kind: FieldKind, raw: &str, required: bool) -> Result<(), String> {
    validate_field(kind, raw, required).map_err(|message| message.trim_end_matches('.').to_string())
}

/// Checks a picked profile image before upload.
pub fn validate_image(mime_type: &str, size_bytes: u64) -> Result<(), String> {
    if !mime_type.starts_with("image/") {
        return Err("Please select a valid image file.".to_string());
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err("Image size must be less than 5MB.".to_string());
    }
    Ok(())
}

fn invalid_message(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "This field is invalid.",
        FieldKind::Email => "Please enter a valid email address.",
        FieldKind::Phone => "Please enter a valid phone number.",
        FieldKind::Username => "Username can only contain letters, numbers, and underscores.",
        FieldKind::CardNumber => "Please enter a valid card number",
        FieldKind::CardExpiry => "Please enter a valid expiry date (MM/YY)",
        FieldKind::CardCvc => "Please enter a valid CVC",
    }
}

/// Formats card digits in groups of four, dropping everything else.
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    let grouped = digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    grouped.chars().take(CARD_NUMBER_MAX_LEN).collect()
}

/// Formats expiry digits as `MM/YY`.
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 2 {
        let year: String = digits[2..].chars().take(2).collect();
        format!("{}/{}", &digits[..2], year)
    } else {
        digits
    }
}

/// Clamps a typed quantity into `[min, max]`.
///
/// Only the leading integer counts, so `"7abc"` is 7 and `"5.5"` is 5. Input
/// without leading digits becomes `min`.
pub fn clamp_quantity(raw: &str, min: u32, max: u32) -> u32 {
    match leading_integer(raw) {
        Some(value) if value < i64::from(min) => min,
        Some(value) if value > i64::from(max) => max,
        Some(value) => value as u32,
        None => min,
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Digits overflowing i64 are far above any max anyway.
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
