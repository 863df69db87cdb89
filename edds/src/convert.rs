//! Checked narrowing for on-disk 32-bit size fields.
//!
//! Every length, size and dimension that crosses the on-disk boundary flows
//! through these guards; the format uses fixed 32-bit fields and the codec
//! refuses values that do not fit rather than truncating them.

use crate::{Error, Result};

/// Narrow a length to the signed 32-bit range of a block size field.
pub fn i32_from_usize(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| Error::SizeOverflow { value: n as u64 })
}

/// Narrow a length to the unsigned 32-bit range of a header field.
pub fn u32_from_usize(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::SizeOverflow { value: n as u64 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_in_range() {
        assert_eq!(i32_from_usize(0).unwrap(), 0);
        assert_eq!(i32_from_usize(i32::MAX as usize).unwrap(), i32::MAX);
    }

    #[test]
    fn test_i32_overflow() {
        let err = i32_from_usize(i32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, Error::SizeOverflow { .. }));
    }

    #[test]
    fn test_u32_in_range() {
        assert_eq!(u32_from_usize(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[test]
    fn test_u32_overflow() {
        let err = u32_from_usize(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, Error::SizeOverflow { .. }));
    }
}
