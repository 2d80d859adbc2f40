//! Compile-time policy constants used across the application.
pub mod orders;
pub mod passwords;
pub mod qr;
pub mod secrets;
pub mod tables;
pub mod tokens;
