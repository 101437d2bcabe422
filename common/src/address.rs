use std::fmt;

use serde::{Deserialize, Serialize};

/// The all-zero 20-byte identifier: "no participant assigned yet."
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Hex-encoded account identifier as reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn zero() -> Self {
        Address(ZERO_ADDRESS.to_string())
    }

    /// True for the zero sentinel. Providers differ on hex casing, so the
    /// comparison is case-insensitive.
    pub fn is_zero(&self) -> bool {
        self.0.eq_ignore_ascii_case(ZERO_ADDRESS)
    }

    /// Abbreviated display form, e.g. "0x1234…abcd".
    pub fn short(&self) -> String {
        if self.0.len() <= 10 {
            return self.0.clone();
        }
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }

    /// Short form for participant columns: the zero sentinel renders as "N/A".
    pub fn display_or_na(&self) -> String {
        if self.is_zero() {
            "N/A".to_string()
        } else {
            self.short()
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}
