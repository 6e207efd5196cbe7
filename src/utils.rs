//! Small numeric helpers.
#![cfg(target_pointer_width = "64")]

/// Returns the number of bits to represent `x` at least.
///
/// # Examples
///
/// ```
/// use rindex::utils::needed_bits;
///
/// assert_eq!(needed_bits(0), 1);
/// assert_eq!(needed_bits(1), 1);
/// assert_eq!(needed_bits(2), 2);
/// assert_eq!(needed_bits(255), 8);
/// assert_eq!(needed_bits(256), 9);
/// ```
pub const fn needed_bits(x: u64) -> usize {
    if x == 0 {
        1
    } else {
        64 - x.leading_zeros() as usize
    }
}

/// Returns `ceil(x / y)`.
///
/// # Examples
///
/// ```
/// use rindex::utils::ceiled_divide;
///
/// assert_eq!(ceiled_divide(10, 2), 5);
/// assert_eq!(ceiled_divide(10, 3), 4);
/// ```
///
/// # Panics
///
/// It will panic if `y == 0`.
pub const fn ceiled_divide(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

/// Returns the text position cyclically preceding `pos` in a text of length `n`.
#[inline(always)]
pub(crate) const fn cyclic_prev(pos: usize, n: usize) -> usize {
    if pos == 0 {
        n - 1
    } else {
        pos - 1
    }
}
