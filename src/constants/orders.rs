//! Limits applied to customer orders.

/// Maximum number of lines in a single order.
pub const MAX_ORDER_LINES: usize = 100;
/// Maximum quantity of a single line.
pub const MAX_LINE_QUANTITY: u32 = 99;
