// SPDX-License-Identifier: Apache-2.0

//! Cookie plumbing for sessions and flash messages.
//!
//! Flash messages follow the post/redirect/get convention: a write handler
//! sets a one-shot cookie alongside its redirect, the next page render shows
//! the message and clears the cookie.

use axum::http::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::warn;

pub(crate) const SESSION_COOKIE: &str = "kopi_session";
pub(crate) const FLASH_COOKIE: &str = "kopi_flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Finds a cookie value in the request's `cookie` headers.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(axum::http::header::COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let Some((key, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub(crate) fn session_cookie(token: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| {
        warn!("session token is not header-safe; emitting an empty set-cookie");
        HeaderValue::from_static("")
    })
}

pub(crate) fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("kopi_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub(crate) fn flash_cookie(flash: &Flash) -> HeaderValue {
    let value = format!(
        "{}:{}",
        flash.level.as_str(),
        percent_encode(&flash.message)
    );
    let cookie = format!("{FLASH_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax");
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| {
        warn!("flash text is not header-safe; emitting an empty set-cookie");
        HeaderValue::from_static("")
    })
}

pub(crate) fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("kopi_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub(crate) fn read_flash(headers: &HeaderMap) -> Option<Flash> {
    let raw = read_cookie(headers, FLASH_COOKIE)?;
    let (level, message) = raw.split_once(':')?;
    Some(Flash {
        level: FlashLevel::parse(level)?,
        message: percent_decode(message)?,
    })
}

/// Minimal percent-encoding keeping flash text cookie-safe. Everything but
/// unreserved ASCII is escaped.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
