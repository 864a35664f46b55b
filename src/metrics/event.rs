//! Event types accepted by the aggregator

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of event recorded against a variant.
///
/// Strings map as `"visit"` → [`EventType::Visit`], `"convert"` →
/// [`EventType::Convert`]; anything else becomes [`EventType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Visitor exposed to the variant
    Visit,
    /// Designated conversion (e.g. purchase); value adds to revenue
    Convert,
    /// Any other event; value (if supplied) adds to revenue
    Custom(String),
}

impl EventType {
    /// Get the wire name of the event.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Visit => "visit",
            Self::Convert => "convert",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "visit" => Self::Visit,
            "convert" => Self::Convert,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "visit" => Self::Visit,
            "convert" => Self::Convert,
            _ => Self::Custom(name),
        }
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        match event {
            EventType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}
