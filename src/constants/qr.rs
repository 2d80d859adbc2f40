//! QR rendering parameters.

/// Smallest edge length of a rendered QR code, in pixels.
pub const QR_MIN_DIMENSION: u32 = 200;
/// Largest edge length of a rendered QR code, in pixels.
pub const QR_MAX_DIMENSION: u32 = 400;
