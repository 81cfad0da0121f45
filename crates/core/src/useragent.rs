//! User agent classification.
//!
//! Deliberately coarse: ordered substring checks against the raw header.
//! Real user agents carry several vendor tokens at once (Edge advertises
//! `Chrome/` and `Safari/`, Chrome advertises `Safari/`), so the check order
//! below is what disambiguates them and must not be rearranged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Firefox,
    Chrome,
    Safari,
    Edge,
    #[serde(rename = "Internet Explorer")]
    InternetExplorer,
    #[serde(other)]
    Unknown,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firefox => "Firefox",
            Self::Chrome => "Chrome",
            Self::Safari => "Safari",
            Self::Edge => "Edge",
            Self::InternetExplorer => "Internet Explorer",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
    #[serde(other)]
    Unknown,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser and device derived from a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAgent {
    pub browser: Browser,
    pub device: Device,
}

impl ClientAgent {
    pub const UNKNOWN: Self = Self {
        browser: Browser::Unknown,
        device: Device::Unknown,
    };
}

/// Classify a user agent header value.
///
/// Never fails. An absent or empty header yields `Unknown`/`Unknown`; any
/// other string gets a device, defaulting to `Desktop` when neither the
/// `Mobile` nor `Tablet` marker is present.
pub fn classify(user_agent: Option<&str>) -> ClientAgent {
    let ua = match user_agent {
        Some(ua) if !ua.is_empty() => ua,
        _ => return ClientAgent::UNKNOWN,
    };

    let browser = if ua.contains("Firefox/") {
        Browser::Firefox
    } else if ua.contains("Chrome/") && !ua.contains("Edg/") {
        Browser::Chrome
    } else if ua.contains("Safari/") && !ua.contains("Chrome/") {
        Browser::Safari
    } else if ua.contains("Edg/") {
        Browser::Edge
    } else if ua.contains("MSIE") || ua.contains("Trident/") {
        Browser::InternetExplorer
    } else {
        Browser::Unknown
    };

    let device = if ua.contains("Mobile") {
        Device::Mobile
    } else if ua.contains("Tablet") {
        Device::Tablet
    } else {
        Device::Desktop
    };

    ClientAgent { browser, device }
}
