//! Scrapers for the portal's HTML and JSON-ish responses.
//!
//! The portal does not return anything we can deserialize reliably, so each
//! step pulls one value out with a regex and maps a miss to the matching
//! error variant.

use std::sync::LazyLock;

use regex::Regex;
use yqfk_core::error::{Result, YqfkError};

/// Marker the SSO endpoint puts in a successful login response.
pub const LOGIN_OK_MARKER: &str = "通过";

/// Markers the report API uses for "done" and "already done".
pub const SUBMITTED_MARKERS: [&str; 2] = ["成功", "已提交"];

static FORM_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var token = "(.*?)";"#).expect("form token regex"));

static REDIRECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""info":"((?:[^"\\]|\\.)*)""#).expect("redirect regex"));

static ACCESS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"access_token=(.*)$").expect("access token regex"));

static REPORT_INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"info":(.*)\}"#).expect("report info regex"));

/// Anti-forgery token from the SSO landing page (`var token = "...";`).
pub fn extract_form_token(html: &str) -> Result<String> {
    FORM_TOKEN_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(YqfkError::TokenNotFound)
}

/// Check the login response for the success marker.
pub fn check_login(body: &str) -> Result<()> {
    if body.contains(LOGIN_OK_MARKER) {
        Ok(())
    } else {
        Err(YqfkError::LoginFailed)
    }
}

/// Redirect URL embedded in the login response as `"info":"https:\/\/..."`,
/// with JSON backslash escapes removed.
pub fn extract_redirect_url(body: &str) -> Result<String> {
    let raw = REDIRECT_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|u| !u.is_empty())
        .ok_or(YqfkError::AccessTokenNotFound)?;
    Ok(unescape(raw))
}

/// Everything after `access_token=` in the final redirect URL.
///
/// The remainder is taken verbatim: a trailing `&foo=bar` or `#frag` ends up
/// inside the token.
pub fn extract_access_token(url: &str) -> Result<String> {
    ACCESS_TOKEN_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(YqfkError::AccessTokenNotFound)
}

/// The `info` fragment of a report-info response, returned as-is so it can
/// be posted back unchanged.
pub fn extract_report_info(body: &str) -> Result<&str> {
    let info = REPORT_INFO_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(YqfkError::ParseInfo)?;
    let trimmed = info.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Err(YqfkError::ParseInfo);
    }
    Ok(info)
}

/// Whether a report-info fragment or a submit response says today's report
/// exists.
pub fn is_submitted(text: &str) -> bool {
    SUBMITTED_MARKERS.iter().any(|m| text.contains(m))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
