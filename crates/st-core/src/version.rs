//! Strongly-typed migration version token.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Opaque version token extracted from a migration resource name.
///
/// Tokens are compared byte-wise. Lexicographic order is the application
/// order, so migration names must use fixed-width, zero-padded prefixes for
/// that order to match the intended chronology. No numeric parsing happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new `Version`, panicking if the token is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(token: impl Into<String>) -> Self {
        let s = token.into();
        assert!(!s.is_empty(), "Version must not be empty");
        Self(s)
    }

    /// Try to create a new `Version`, returning `None` if the token is empty.
    pub fn try_new(token: impl Into<String>) -> Option<Self> {
        let s = token.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::try_new(s).ok_or_else(|| serde::de::Error::custom("Version must not be empty"))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Version {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
