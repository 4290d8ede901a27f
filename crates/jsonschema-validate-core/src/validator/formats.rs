//! Semantic checks behind the string `format` keyword.
//!
//! Only the formats extraction schemas use in practice are recognised; any
//! other `format` value is ignored by the compiler.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("EMAIL_RE is a valid regex")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID_RE is a valid regex")
});

/// A recognised string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    /// Canonical hyphenated 8-4-4-4-12 form.
    Uuid,
    /// Absolute URL. Covers both `uri` and `url`.
    Uri,
    /// RFC 3339 timestamp.
    DateTime,
}

impl StringFormat {
    pub fn from_keyword(format: &str) -> Option<Self> {
        match format {
            "email" => Some(Self::Email),
            "uuid" => Some(Self::Uuid),
            "uri" | "url" => Some(Self::Uri),
            "date-time" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::DateTime => "date-time",
        }
    }

    pub fn matches(self, s: &str) -> bool {
        match self {
            Self::Email => EMAIL_RE.is_match(s),
            Self::Uuid => UUID_RE.is_match(s),
            Self::Uri => Url::parse(s).is_ok(),
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
        }
    }
}
