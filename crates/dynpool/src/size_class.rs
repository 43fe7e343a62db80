//! Power-of-two size-class arithmetic.
//!
//! Class `i` holds blocks of `1 << (min_class_bits + i)` bytes. A request is
//! served by the smallest class whose block size is at least the request.

/// Number of bits of the smallest class (512 bytes).
pub const MIN_CLASS_BITS: u32 = 9;

/// Block size of the smallest class.
pub const MIN_CLASS_SIZE: usize = 1 << MIN_CLASS_BITS;

/// Number of classes in the default ladder.
pub const CLASS_COUNT: usize = 14;

/// Block size of the largest class in the default ladder (4 MiB).
pub const MAX_CLASS_SIZE: usize = MIN_CLASS_SIZE << (CLASS_COUNT - 1);

/// Index of the smallest class able to hold `size` bytes.
///
/// Equals `ceil(log2(size / min_class_size))`, with every size up to the
/// minimum class mapping to 0. The result is not clamped to any class count;
/// callers compare it against their own table length.
#[inline]
#[must_use]
pub fn class_for(size: usize, min_class_bits: u32) -> usize {
    let scaled = size.saturating_sub(1) >> min_class_bits;
    if scaled == 0 {
        return 0;
    }
    (usize::BITS - scaled.leading_zeros()) as usize
}

/// Block size of class `index`.
#[inline]
#[must_use]
pub fn class_size(index: usize, min_class_bits: u32) -> usize {
    1usize << (min_class_bits as usize + index)
}
