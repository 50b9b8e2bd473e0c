use std::fmt;

use thiserror::Error;

use crate::memory::Width;

#[derive(Debug, Error, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpcodeError {
    #[error("{0} index {1} out of bounds, must be [0, {2})")]
    IndexOutOfBounds(&'static str, usize, usize),
}

pub type Result<T> = std::result::Result<T, OpcodeError>;

const MASK_BIT: u32 = 0x01;
const MASK_BYTE: u32 = 0xFF;
const MASK_NYBBLE: u32 = 0x0F;

/// A raw instruction word as fetched, together with the width it was fetched at.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode {
    value: u32,
    width: Width,
}

impl Opcode {
    pub fn new(value: u32, width: Width) -> Self {
        Self {
            value: value & width.mask(),
            width,
        }
    }

    fn extract(
        &self,
        idx_type: &'static str,
        idx: usize,
        count: usize,
        mask: u32,
        shift: usize,
    ) -> Result<u8> {
        if idx >= count {
            return Err(OpcodeError::IndexOutOfBounds(idx_type, idx, count));
        }
        // mask is at most 8 bits wide
        Ok(((self.value >> shift) & mask) as u8)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn try_get_bit(&self, idx: usize) -> Result<u8> {
        self.extract("bit", idx, self.width.bits() as usize, MASK_BIT, idx)
    }

    pub fn try_get_byte(&self, idx: usize) -> Result<u8> {
        self.extract("byte", idx, self.width.bytes(), MASK_BYTE, idx * 8)
    }

    pub fn try_get_nybble(&self, idx: usize) -> Result<u8> {
        self.extract("nybble", idx, self.width.bytes() * 2, MASK_NYBBLE, idx * 4)
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.width().bytes() * 2;
        f.write_fmt(format_args!("0x{:0digits$X}", self.value, digits = digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUE: u32 = 0x89AB_CDEF;
    const WIDTHS: [Width; 3] = [Width::Byte, Width::HalfWord, Width::Word];

    fn assert_expected(
        idx_type: &'static str,
        idx: usize,
        count: usize,
        mask: u32,
        shift: usize,
        result: Result<u8>,
    ) {
        if idx < count {
            let expected = ((VALUE >> shift) & mask) as u8;
            assert_eq!(result, Ok(expected));
        } else {
            assert_eq!(
                result,
                Err(OpcodeError::IndexOutOfBounds(idx_type, idx, count))
            );
        }
    }

    #[test]
    fn value_is_truncated_to_width() {
        assert_eq!(Opcode::new(VALUE, Width::Byte).value(), 0xEF);
        assert_eq!(Opcode::new(VALUE, Width::HalfWord).value(), 0xCDEF);
        assert_eq!(Opcode::new(VALUE, Width::Word).value(), VALUE);
        for width in WIDTHS {
            assert_eq!(Opcode::new(VALUE, width).width(), width);
        }
        assert_eq!(format!("{:?}", Opcode::new(0x2B, Width::Byte)), "0x2B");
        assert_eq!(format!("{:?}", Opcode::new(0x101, Width::Word)), "0x00000101");
    }

    #[test]
    fn test_opcode_bits() {
        for width in WIDTHS {
            let op = Opcode::new(VALUE, width);
            for idx in 0..=32 {
                let count = width.bits() as usize;
                assert_expected("bit", idx, count, MASK_BIT, idx, op.try_get_bit(idx));
            }
        }
    }

    #[test]
    fn test_opcode_bytes() {
        for width in WIDTHS {
            let op = Opcode::new(VALUE, width);
            for idx in 0..=4 {
                let count = width.bytes();
                assert_expected("byte", idx, count, MASK_BYTE, idx * 8, op.try_get_byte(idx));
            }
        }
    }

    #[test]
    fn test_opcode_nybbles() {
        for width in WIDTHS {
            let op = Opcode::new(VALUE, width);
            for idx in 0..=8 {
                let count = width.bytes() * 2;
                assert_expected(
                    "nybble",
                    idx,
                    count,
                    MASK_NYBBLE,
                    idx * 4,
                    op.try_get_nybble(idx),
                );
            }
        }
    }
}
