use std::{fmt, ops};

mod file;

pub use file::{RegisterFile, RegisterName};

/// Every register is 32 bits wide; results are reduced modulo 2^32 before they are stored.
pub const REGISTER_MASK: u64 = 0xFFFF_FFFF;

/// A fixed-width unsigned register with wraparound arithmetic.
///
/// Operators accept either a `u32` or another `Register` on the right-hand side, and a `u32` on
/// the left-hand side for the reflected forms. Operands are widened before the operation, so
/// `a - b` where `b > a` wraps exactly as `(a - b) mod 2^32`.
///
/// Division truncates. Dividing by zero yields `0xFFFF_FFFF` (all ones), matching the RISC-V
/// `DIVU` convention, so no register operation can fail. Shifts are logical, and shifting by 32
/// or more clears the register.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register {
    value: u32,
}

impl Register {
    pub const fn new(value: u64) -> Self {
        Self {
            value: (value & REGISTER_MASK) as u32,
        }
    }

    pub const fn read(&self) -> u32 {
        self.value
    }

    pub fn write(&mut self, value: u32) {
        self.value = value;
    }
}

impl From<u32> for Register {
    fn from(value: u32) -> Self {
        Self { value }
    }
}

impl From<Register> for u32 {
    fn from(register: Register) -> Self {
        register.value
    }
}

impl From<Register> for u64 {
    fn from(register: Register) -> Self {
        u64::from(register.value)
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("0x{:08X}", self.value))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Both operands are at most 32 bits wide, so none of these can overflow a u64; the caller masks.
mod arith {
    pub fn add(lhs: u64, rhs: u64) -> u64 {
        lhs + rhs
    }

    pub fn sub(lhs: u64, rhs: u64) -> u64 {
        lhs.wrapping_sub(rhs)
    }

    pub fn mul(lhs: u64, rhs: u64) -> u64 {
        lhs * rhs
    }

    pub fn div(lhs: u64, rhs: u64) -> u64 {
        lhs.checked_div(rhs).unwrap_or(super::REGISTER_MASK)
    }

    pub fn shl(lhs: u64, rhs: u64) -> u64 {
        if rhs >= 32 {
            0
        } else {
            lhs << rhs
        }
    }

    pub fn shr(lhs: u64, rhs: u64) -> u64 {
        if rhs >= 32 {
            0
        } else {
            lhs >> rhs
        }
    }

    pub fn and(lhs: u64, rhs: u64) -> u64 {
        lhs & rhs
    }

    pub fn or(lhs: u64, rhs: u64) -> u64 {
        lhs | rhs
    }

    pub fn xor(lhs: u64, rhs: u64) -> u64 {
        lhs ^ rhs
    }
}

macro_rules! register_op {
    ($op:ident, $op_fn:ident, $assign:ident, $assign_fn:ident, $apply:path) => {
        impl ops::$op<u32> for Register {
            type Output = Register;

            fn $op_fn(self, rhs: u32) -> Register {
                Register::new($apply(u64::from(self.value), u64::from(rhs)))
            }
        }

        impl ops::$op<Register> for Register {
            type Output = Register;

            fn $op_fn(self, rhs: Register) -> Register {
                Register::new($apply(u64::from(self.value), u64::from(rhs.value)))
            }
        }

        impl ops::$op<Register> for u32 {
            type Output = Register;

            fn $op_fn(self, rhs: Register) -> Register {
                Register::new($apply(u64::from(self), u64::from(rhs.value)))
            }
        }

        impl ops::$assign<u32> for Register {
            fn $assign_fn(&mut self, rhs: u32) {
                *self = ops::$op::$op_fn(*self, rhs);
            }
        }

        impl ops::$assign<Register> for Register {
            fn $assign_fn(&mut self, rhs: Register) {
                *self = ops::$op::$op_fn(*self, rhs);
            }
        }
    };
}

register_op!(Add, add, AddAssign, add_assign, arith::add);
register_op!(Sub, sub, SubAssign, sub_assign, arith::sub);
register_op!(Mul, mul, MulAssign, mul_assign, arith::mul);
register_op!(Div, div, DivAssign, div_assign, arith::div);
register_op!(Shl, shl, ShlAssign, shl_assign, arith::shl);
register_op!(Shr, shr, ShrAssign, shr_assign, arith::shr);
register_op!(BitAnd, bitand, BitAndAssign, bitand_assign, arith::and);
register_op!(BitOr, bitor, BitOrAssign, bitor_assign, arith::or);
register_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, arith::xor);
