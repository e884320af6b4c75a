//! Anti-forgery token lookup.
//!
//! The backend issues its token in a cookie named `csrftoken` and expects it
//! back in the `X-CSRFToken` header of every mutating request.

use std::fmt;

/// Cookie the backend stores the anti-forgery token in.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header every mutating request carries the token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// A per-session anti-forgery token.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        CsrfToken(value.into())
    }

    /// Extracts the `csrftoken` cookie from a raw `Cookie:` header string.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        cookie_value(header, CSRF_COOKIE_NAME).map(CsrfToken)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are secrets; keep them out of logs.
impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

/// Looks up `name` in a `;`-separated cookie string and percent-decodes its value.
///
/// Returns the first match. Empty headers and missing cookies yield `None`.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| percent_decode(value))
        })
}

/// Decodes `%XX` escapes. Malformed escapes are kept verbatim.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
