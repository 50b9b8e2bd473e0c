use crate::component::{Component, ComponentId};
use crate::memory::{
    Access, AccessStats, MemoryDevice, MemoryError, MemoryRequest, MemoryResponse, MemoryResult,
};

use super::StorageState;

/// Read-only instruction store, preloaded from an image and zero-filled up to its size.
#[derive(Clone, Debug)]
pub struct ROM {
    id: ComponentId,
    state: StorageState,
}

impl Component for ROM {
    fn id(&self) -> &ComponentId {
        &self.id
    }
}

impl MemoryDevice for ROM {
    fn base(&self) -> u64 {
        self.state.base
    }

    fn size(&self) -> u64 {
        self.state.size()
    }

    fn access(&mut self, request: MemoryRequest) -> MemoryResult<MemoryResponse> {
        match request.access {
            Access::Load => self.state.load(&self.id, &request),
            Access::Store(_) => Err(MemoryError::ReadOnlyViolation {
                device: self.id.clone(),
                address: request.address,
            }),
        }
    }

    fn stats(&self) -> AccessStats {
        self.state.stats
    }
}

impl ROM {
    pub fn new(name: &str, base: u64, size: usize, contents: &[u8]) -> MemoryResult<Self> {
        let id = ComponentId::new(name);
        if contents.len() > size {
            return Err(MemoryError::ImageTooLarge {
                device: id,
                len: contents.len(),
                size,
            });
        }

        let mut buffer = vec![0; size];
        buffer[..contents.len()].copy_from_slice(contents);
        Ok(Self {
            id,
            state: StorageState::new(base, buffer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preloaded_and_zero_filled() {
        let mut rom = ROM::new("code", 0, 0x10, b"++.").unwrap();
        assert_eq!(rom.size(), 0x10);
        assert_eq!(rom.load8(0).unwrap(), u32::from(b'+'));
        assert_eq!(rom.load8(2).unwrap(), u32::from(b'.'));
        assert_eq!(rom.load32(4).unwrap(), 0);
        assert_eq!(rom.load8(0xF).unwrap(), 0);
    }

    #[test]
    fn stores_are_rejected_everywhere() {
        let mut rom = ROM::new("code", 0x40, 0x40, &[0xAA; 0x40]).unwrap();
        for address in 0x40..0x80 {
            assert_eq!(
                rom.store8(address, 0),
                Err(MemoryError::ReadOnlyViolation {
                    device: rom.id().clone(),
                    address,
                })
            );
            assert_eq!(rom.load8(address).unwrap(), 0xAA);
        }
        assert_eq!(rom.stats().num_writes, 0);
    }

    #[test]
    fn oversized_image() {
        let result = ROM::new("code", 0, 2, b"abc");
        assert!(matches!(
            result,
            Err(MemoryError::ImageTooLarge { len: 3, size: 2, .. })
        ));
    }
}
