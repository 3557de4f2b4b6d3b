//! Payload models published by the harness.

use std::fmt;

/// A named quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Quote {
    pub(crate) name: String,
    pub(crate) description: String,
}

impl Quote {
    /// Build a quote whose fields are tagged with `n`.
    pub(crate) fn numbered(n: u32) -> Self {
        Self {
            name: format!("NAME: {n}"),
            description: format!("DESC: {n}"),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.name, self.description)
    }
}

/// A named notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) name: String,
    pub(crate) message: String,
}

impl Notice {
    /// Build a notice whose fields are tagged with `n`.
    pub(crate) fn numbered(n: u32) -> Self {
        Self {
            name: format!("NAME: {n}"),
            message: format!("MSG: {n}"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.name, self.message)
    }
}
