//! Constants for bearer tokens and manager invites.
use time::Duration;

/// How long a manager invite stays redeemable.
pub const INVITE_LIFETIME: Duration = Duration::days(7);
/// Number of random bytes in an invite token (hex encoded on the wire).
pub const INVITE_TOKEN_BYTES: usize = 32;
/// Signing key used when none is configured. Only acceptable for local development.
pub const DEVELOPMENT_JWT_SECRET: &str = "letsorder-development-secret-change-me";
