//! PIN type
//!
//! A personal identification number is exactly four ASCII digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Required PIN length
const PIN_LENGTH: usize = 4;

/// Validated four-digit PIN.
///
/// `Debug` and `Display` never print the digits.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    /// Validate and wrap a PIN
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.len() != PIN_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidPin(
                "PIN must be a 4-digit number".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Exact comparison against a candidate supplied by a caller.
    /// The candidate is not validated: a malformed candidate simply does not match.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl FromStr for Pin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pin::new(s)
    }
}

impl TryFrom<String> for Pin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pin::new(value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}
