//! API credential passed through to capabilities.
//!
//! The core never looks inside the credential. It only keeps it out of
//! logs and hands it to the capability that needs it.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const KNOWN_PREFIX: &str = "sk-";
const MASK: &str = "••••••••••••••••••••••••••••••";

/// An opaque API key (e.g. for the summarization service).
///
/// `Debug`, `Display` and `Serialize` only ever show the masked form.
pub struct ApiCredential(SecretBox<str>);

impl ApiCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// The raw key. Call only when building the outbound request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Keeps only the well-known `sk-` prefix: `sk-••••…`.
    pub fn masked(&self) -> String {
        let prefix = if self.expose().starts_with(KNOWN_PREFIX) {
            KNOWN_PREFIX
        } else {
            ""
        };
        format!("{prefix}{MASK}")
    }
}

impl Clone for ApiCredential {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for ApiCredential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<String> for ApiCredential {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiCredential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for ApiCredential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.masked())
    }
}

impl<'de> Deserialize<'de> for ApiCredential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.contains('•') {
            return Err(serde::de::Error::custom(
                "credential is a masked placeholder, not a key",
            ));
        }
        Ok(Self::new(value))
    }
}
