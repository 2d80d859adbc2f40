//! Constants for table unique codes.

/// Length of a table's unique code.
pub const TABLE_CODE_LENGTH: usize = 8;
/// Characters a table code is drawn from.
pub const TABLE_CODE_ALPHABET: &[char; 36] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
/// How many times to redraw a code that collides with an existing one.
pub const TABLE_CODE_MAX_ATTEMPTS: usize = 10;
