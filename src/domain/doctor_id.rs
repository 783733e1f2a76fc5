//! Type-safe doctor identifier.
//!
//! [`DoctorId`] is a newtype wrapper around the numeric primary key the
//! clinic server assigns to each doctor. Cards on the booking page expose it
//! as a `data-id` attribute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Unique identifier of a doctor.
///
/// Serialized as a bare JSON number so booking bodies read
/// `"doctorId": 7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(u64);

impl DoctorId {
    /// Identifier used when a card carries no `data-id`, or a blank one.
    pub const FALLBACK: Self = Self(1);

    /// Creates a `DoctorId` from a raw numeric key.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner numeric key.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Resolves a `data-id` attribute value.
    ///
    /// Missing and blank values resolve to [`DoctorId::FALLBACK`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidDoctorId`] for any other value that is
    /// not a non-negative integer.
    pub fn from_attribute(raw: Option<&str>) -> Result<Self, ClientError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::FALLBACK),
            Some(value) => value
                .parse()
                .map(Self)
                .map_err(|_| ClientError::InvalidDoctorId(value.to_string())),
        }
    }
}

impl Default for DoctorId {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DoctorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for DoctorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn attribute_with_number_is_used() {
        assert_eq!(DoctorId::from_attribute(Some("7")).ok(), Some(DoctorId::new(7)));
        assert_eq!(DoctorId::from_attribute(Some(" 42 ")).ok(), Some(DoctorId::new(42)));
    }

    #[test]
    fn missing_or_blank_attribute_falls_back_to_one() {
        for raw in [None, Some(""), Some("   ")] {
            assert_eq!(DoctorId::from_attribute(raw).ok(), Some(DoctorId::new(1)));
        }
    }

    #[test]
    fn malformed_attribute_is_rejected() {
        for raw in ["dr-house", "-3", "7a", "1.5"] {
            let Err(ClientError::InvalidDoctorId(value)) = DoctorId::from_attribute(Some(raw)) else {
                panic!("{raw:?} should be rejected");
            };
            assert_eq!(value, raw);
        }
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&DoctorId::new(12)).ok();
        assert_eq!(json.as_deref(), Some("12"));
    }

    #[test]
    fn display_and_parse_agree() {
        let Ok(id) = "15".parse::<DoctorId>() else {
            panic!("parse failed");
        };
        assert_eq!(id.to_string(), "15");
        assert_eq!(id.get(), 15);
    }
}
