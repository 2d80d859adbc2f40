//! Password length policy for manager accounts.

/// Shortest accepted password, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;
/// Longest accepted password. Caps the work Argon2 is asked to do per login.
pub const PASSWORD_MAX_LENGTH: usize = 128;
