//! Validated email addresses.
use std::sync::LazyLock;

use serde::Serialize;
use thiserror::Error;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+$")
        .expect("Email regex invalid")
});

/// Returned when a string does not look like an email address.
#[derive(Error, Debug)]
#[error("Invalid email address")]
pub struct InvalidEmailAddress;

/// An email address that has passed format validation. Stored lowercased so
/// that lookups are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = InvalidEmailAddress;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if EMAIL_REGEX.is_match(trimmed) {
            Ok(Self(trimmed.to_lowercase()))
        } else {
            Err(InvalidEmailAddress)
        }
    }
}

impl From<EmailAddress> for String {
    fn from(addr: EmailAddress) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn accepts_ordinary_addresses() {
        let addr = EmailAddress::try_from("Owner.Name+menu@Example.co.uk").unwrap();
        assert_eq!(addr.as_str(), "owner.name+menu@example.co.uk");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "a@b", "@example.com", "a b@example.com"] {
            assert!(EmailAddress::try_from(bad).is_err(), "{bad} should be rejected");
        }
    }
}
