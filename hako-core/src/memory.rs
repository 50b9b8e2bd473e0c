use std::fmt;

use thiserror::Error;

use crate::component::{Component, ComponentId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("no device is mapped at address 0x{0:08X}")]
    UnmappedAddress(u64),
    #[error("{width}-bit access at 0x{address:08X} is out of range for {device}")]
    OutOfRange {
        device: ComponentId,
        address: u64,
        width: Width,
    },
    #[error("cannot store to read-only device {device} at 0x{address:08X}")]
    ReadOnlyViolation { device: ComponentId, address: u64 },
    #[error("value 0x{data:X} does not fit in a {width}-bit store")]
    DataTooWide { data: u32, width: Width },
    #[error("image of {len} bytes does not fit in {device} ({size} bytes)")]
    ImageTooLarge {
        device: ComponentId,
        len: usize,
        size: usize,
    },
    #[error("device {0} has no addressable bytes")]
    EmptyDevice(ComponentId),
    #[error("device {device} at 0x{start:08X} - 0x{end:08X} overlaps {existing}")]
    OverlappingDevice {
        device: ComponentId,
        existing: ComponentId,
        start: u64,
        end: u64,
    },
    #[error("device {device} at 0x{base:X} ({size} bytes) lies outside the address space")]
    OutsideAddressSpace {
        device: ComponentId,
        base: u64,
        size: u64,
    },
    #[error("device {device} returned no data for a load at 0x{address:08X}")]
    UnexpectedResponse { device: ComponentId, address: u64 },
}

pub type MemoryResult<T> = std::result::Result<T, MemoryError>;

/// Size of a single memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    Byte,
    HalfWord,
    Word,
}

impl Width {
    pub const fn bits(self) -> u32 {
        match self {
            Width::Byte => 8,
            Width::HalfWord => 16,
            Width::Word => 32,
        }
    }

    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub const fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::HalfWord => 0xFFFF,
            Width::Word => 0xFFFF_FFFF,
        }
    }

    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Width::Byte),
            16 => Some(Width::HalfWord),
            32 => Some(Width::Word),
            _ => None,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Direction of an access. Store data travels with the variant, so a load can never carry data
/// and a store can never lack it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Load,
    Store(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryRequest {
    pub address: u64,
    pub width: Width,
    pub access: Access,
}

impl MemoryRequest {
    pub const fn load(address: u64, width: Width) -> Self {
        Self {
            address,
            width,
            access: Access::Load,
        }
    }

    pub const fn store(address: u64, width: Width, data: u32) -> Self {
        Self {
            address,
            width,
            access: Access::Store(data),
        }
    }

    pub const fn load8(address: u64) -> Self {
        Self::load(address, Width::Byte)
    }

    pub const fn load16(address: u64) -> Self {
        Self::load(address, Width::HalfWord)
    }

    pub const fn load32(address: u64) -> Self {
        Self::load(address, Width::Word)
    }

    pub const fn store8(address: u64, data: u32) -> Self {
        Self::store(address, Width::Byte, data)
    }

    pub const fn store16(address: u64, data: u32) -> Self {
        Self::store(address, Width::HalfWord, data)
    }

    pub const fn store32(address: u64, data: u32) -> Self {
        Self::store(address, Width::Word, data)
    }
}

impl fmt::Display for MemoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access {
            Access::Load => write!(f, "load{} 0x{:08X}", self.width, self.address),
            Access::Store(data) => write!(
                f,
                "store{} 0x{:08X} <- 0x{:X}",
                self.width, self.address, data
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryResponse {
    Loaded(u32),
    Stored,
}

impl MemoryResponse {
    pub fn value(self) -> Option<u32> {
        match self {
            MemoryResponse::Loaded(value) => Some(value),
            MemoryResponse::Stored => None,
        }
    }
}

/// Running totals of the accesses a device has served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessStats {
    pub bytes_read: usize,
    pub bytes_written: usize,
    pub num_reads: usize,
    pub num_writes: usize,
}

impl std::ops::Add for AccessStats {
    type Output = AccessStats;

    fn add(self, rhs: AccessStats) -> AccessStats {
        AccessStats {
            bytes_read: self.bytes_read + rhs.bytes_read,
            bytes_written: self.bytes_written + rhs.bytes_written,
            num_reads: self.num_reads + rhs.num_reads,
            num_writes: self.num_writes + rhs.num_writes,
        }
    }
}

/// A component that serves loads and stores over the half-open range `[base, base + size)`.
///
/// `base` and `size` must not change once the device has been handed to an [`Mmu`](crate::Mmu).
pub trait MemoryDevice: Component {
    fn base(&self) -> u64;
    fn size(&self) -> u64;
    fn access(&mut self, request: MemoryRequest) -> MemoryResult<MemoryResponse>;

    /// Hook for devices with side effects outside memory (a framebuffer, say). Only the driving
    /// loop calls it, once per step.
    fn update(&mut self) {}

    fn stats(&self) -> AccessStats {
        AccessStats::default()
    }

    fn contains(&self, address: u64) -> bool {
        self.base() <= address && address - self.base() < self.size()
    }

    fn load(&mut self, address: u64, width: Width) -> MemoryResult<u32> {
        self.access(MemoryRequest::load(address, width))?
            .value()
            .ok_or_else(|| MemoryError::UnexpectedResponse {
                device: self.id().clone(),
                address,
            })
    }

    fn store(&mut self, address: u64, width: Width, data: u32) -> MemoryResult<()> {
        self.access(MemoryRequest::store(address, width, data))?;
        Ok(())
    }

    fn load8(&mut self, address: u64) -> MemoryResult<u32> {
        self.load(address, Width::Byte)
    }

    fn load16(&mut self, address: u64) -> MemoryResult<u32> {
        self.load(address, Width::HalfWord)
    }

    fn load32(&mut self, address: u64) -> MemoryResult<u32> {
        self.load(address, Width::Word)
    }

    fn store8(&mut self, address: u64, data: u32) -> MemoryResult<()> {
        self.store(address, Width::Byte, data)
    }

    fn store16(&mut self, address: u64, data: u32) -> MemoryResult<()> {
        self.store(address, Width::HalfWord, data)
    }

    fn store32(&mut self, address: u64, data: u32) -> MemoryResult<()> {
        self.store(address, Width::Word, data)
    }
}

pub(crate) fn deserialize(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .fold(0, |value, byte| (value << 8) | u32::from(*byte))
}

pub(crate) fn serialize(data: u32, width: Width) -> MemoryResult<Vec<u8>> {
    if data & !width.mask() != 0 {
        return Err(MemoryError::DataTooWide { data, width });
    }
    Ok(data.to_le_bytes()[..width.bytes()].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_conversions() {
        for width in [Width::Byte, Width::HalfWord, Width::Word] {
            assert_eq!(width.bits() % 8, 0);
            assert_eq!(width.bytes() * 8, width.bits() as usize);
            assert_eq!(Width::from_bits(width.bits()), Some(width));
        }
        assert_eq!(Width::from_bits(24), None);
        assert_eq!(Width::from_bits(64), None);
    }

    #[test]
    fn requests_carry_data_only_for_stores() {
        assert_eq!(MemoryRequest::load16(0x10).access, Access::Load);
        assert_eq!(MemoryRequest::store32(0x10, 7).access, Access::Store(7));
        assert_eq!(MemoryRequest::store8(0x10, 7).width, Width::Byte);
        assert_eq!(
            format!("{}", MemoryRequest::store16(0x800, 0xAB)),
            "store16 0x00000800 <- 0xAB"
        );
    }

    #[test]
    fn only_loads_carry_a_value() {
        assert_eq!(MemoryResponse::Loaded(0xAB).value(), Some(0xAB));
        assert_eq!(MemoryResponse::Stored.value(), None);
    }

    #[test]
    fn little_endian() {
        assert_eq!(deserialize(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(deserialize(&[0xFF]), 0xFF);
        assert_eq!(serialize(0x1234, Width::HalfWord).unwrap(), vec![0x34, 0x12]);
        assert_eq!(
            serialize(0xDEAD_BEEF, Width::Word).unwrap(),
            vec![0xEF, 0xBE, 0xAD, 0xDE]
        );
    }

    #[test]
    fn oversized_store_data_is_rejected() {
        assert_eq!(
            serialize(0x100, Width::Byte),
            Err(MemoryError::DataTooWide {
                data: 0x100,
                width: Width::Byte
            })
        );
        assert!(serialize(0xFFFF, Width::HalfWord).is_ok());
    }
}
