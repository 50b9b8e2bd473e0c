use std::fmt;
use std::ops::Range;

use rangemap::RangeMap;

use crate::component::{Component, ComponentId};
use crate::memory::{AccessStats, MemoryDevice, MemoryError, MemoryRequest, MemoryResponse, MemoryResult};

/// Size of the address space the MMU presents: `[0, 2^32)`.
pub const ADDRESS_SPACE_SIZE: u64 = 1 << 32;

/// Routes every access to the single child device whose range contains the target address.
///
/// Child ranges never overlap: [`Mmu::add_device`] rejects a device that would overlap one that
/// is already mapped, so routing is unambiguous regardless of registration order.
pub struct Mmu {
    id: ComponentId,
    devices: Vec<Box<dyn MemoryDevice>>,
    mappings: RangeMap<u64, usize>,
}

impl fmt::Debug for Mmu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mmu[{}]", self.id)
    }
}

impl Component for Mmu {
    fn id(&self) -> &ComponentId {
        &self.id
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            id: ComponentId::new("MMU"),
            devices: Vec::new(),
            mappings: RangeMap::new(),
        }
    }

    pub fn with_devices(
        devices: impl IntoIterator<Item = Box<dyn MemoryDevice>>,
    ) -> MemoryResult<Self> {
        let mut mmu = Self::new();
        for device in devices {
            mmu.add_boxed_device(device)?;
        }
        Ok(mmu)
    }

    pub fn add_device(&mut self, device: impl MemoryDevice) -> MemoryResult<()> {
        self.add_boxed_device(Box::new(device))
    }

    pub fn add_boxed_device(&mut self, device: Box<dyn MemoryDevice>) -> MemoryResult<()> {
        if device.size() == 0 {
            return Err(MemoryError::EmptyDevice(device.id().clone()));
        }

        let end = device
            .base()
            .checked_add(device.size())
            .filter(|end| *end <= ADDRESS_SPACE_SIZE)
            .ok_or_else(|| MemoryError::OutsideAddressSpace {
                device: device.id().clone(),
                base: device.base(),
                size: device.size(),
            })?;
        let range = Range {
            start: device.base(),
            end,
        };
        if let Some((_, index)) = self.mappings.overlapping(&range).next() {
            return Err(MemoryError::OverlappingDevice {
                device: device.id().clone(),
                existing: self.devices[*index].id().clone(),
                start: range.start,
                end: range.end,
            });
        }

        tracing::info!(
            "mapping {} at 0x{:08X} - 0x{:08X}",
            device.id(),
            range.start,
            range.end
        );
        self.mappings.insert(range, self.devices.len());
        self.devices.push(device);
        for (range, index) in self.mappings.iter() {
            tracing::debug!(
                "\t0x{:08X} - 0x{:08X}: {}",
                range.start,
                range.end,
                self.devices[*index].id()
            );
        }
        Ok(())
    }

    /// Devices in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &dyn MemoryDevice> + '_ {
        self.devices.iter().map(|device| {
            let device: &dyn MemoryDevice = device.as_ref();
            device
        })
    }

    /// Runs the `update` hook of every child device. Meant for the driving loop, never for
    /// instructions.
    pub fn update_devices(&mut self) {
        for device in self.devices.iter_mut() {
            device.update();
        }
    }

    /// Writes `bytes` to consecutive addresses starting at `address`, one byte store at a time.
    pub fn load_data(&mut self, address: u64, bytes: &[u8]) -> MemoryResult<()> {
        tracing::info!("loading {} bytes at 0x{:08X}", bytes.len(), address);
        for (offset, byte) in bytes.iter().enumerate() {
            let target = address
                .checked_add(offset as u64)
                .ok_or(MemoryError::UnmappedAddress(address))?;
            self.store8(target, u32::from(*byte))?;
        }
        Ok(())
    }

    fn device_at(&mut self, address: u64) -> MemoryResult<&mut Box<dyn MemoryDevice>> {
        let index = *self
            .mappings
            .get(&address)
            .ok_or(MemoryError::UnmappedAddress(address))?;
        Ok(&mut self.devices[index])
    }
}

impl MemoryDevice for Mmu {
    fn base(&self) -> u64 {
        0
    }

    fn size(&self) -> u64 {
        ADDRESS_SPACE_SIZE
    }

    fn access(&mut self, request: MemoryRequest) -> MemoryResult<MemoryResponse> {
        self.device_at(request.address)?.access(request)
    }

    fn stats(&self) -> AccessStats {
        self.devices
            .iter()
            .fold(AccessStats::default(), |total, device| total + device.stats())
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::memory::Width;
    use crate::storage::{DataMemory, RAM, ROM};

    fn setup() -> Mmu {
        let mut mmu = Mmu::new();
        mmu.add_device(ROM::new("a", 0x0000, 0x800, &[0xAA; 0x800]).unwrap())
            .unwrap();
        mmu.add_device(ROM::new("b", 0x0800, 0x800, &[0xBB; 0x800]).unwrap())
            .unwrap();
        mmu
    }

    #[test]
    fn new_works() {
        let mmu = Mmu::new();
        assert_eq!(mmu.base(), 0);
        assert_eq!(mmu.size(), ADDRESS_SPACE_SIZE);
        assert_eq!(mmu.devices().count(), 0);
        assert!(mmu.contains(0xFFFF_FFFF));
        assert!(!mmu.contains(ADDRESS_SPACE_SIZE));
    }

    #[test]
    fn routes_to_containing_device() {
        let mut mmu = setup();
        assert_eq!(mmu.load8(0x0000).unwrap(), 0xAA);
        assert_eq!(mmu.load8(0x07FF).unwrap(), 0xAA);
        assert_eq!(mmu.load8(0x0800).unwrap(), 0xBB);
        assert_eq!(mmu.load8(0x0FFF).unwrap(), 0xBB);
        assert_eq!(
            mmu.load8(0x1000),
            Err(MemoryError::UnmappedAddress(0x1000))
        );

        let stats: Vec<_> = mmu.devices().map(|device| device.stats().num_reads).collect();
        assert_eq!(stats, vec![2, 2]);
    }

    #[test]
    fn empty_mmu_maps_nothing() {
        let mut mmu = Mmu::new();
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let address = rng.gen_range(0..ADDRESS_SPACE_SIZE);
            assert_eq!(
                mmu.load32(address),
                Err(MemoryError::UnmappedAddress(address))
            );
        }
    }

    #[test]
    fn access_straddling_a_device_end_is_out_of_range() {
        let mut mmu = setup();
        assert!(matches!(
            mmu.load32(0x07FE),
            Err(MemoryError::OutOfRange { address: 0x07FE, width: Width::Word, .. })
        ));
    }

    #[test]
    fn rejects_overlapping_devices() {
        let mut mmu = setup();
        let result = mmu.add_device(RAM::new("c", 0x0F00, 0x200));
        match result {
            Err(MemoryError::OverlappingDevice {
                device,
                existing,
                start,
                end,
            }) => {
                assert_eq!(device.name(), "c");
                assert_eq!(existing.name(), "b");
                assert_eq!((start, end), (0x0F00, 0x1100));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(mmu.devices().count(), 2);
        assert_eq!(mmu.load8(0x0F00).unwrap(), 0xBB);

        mmu.add_device(RAM::new("c", 0x1000, 0x200)).unwrap();
        assert_eq!(mmu.devices().count(), 3);
    }

    #[test]
    fn rejects_devices_outside_the_address_space() {
        let mut mmu = Mmu::new();
        assert!(matches!(
            mmu.add_device(RAM::new("top", u64::MAX, 1)),
            Err(MemoryError::OutsideAddressSpace { base: u64::MAX, size: 1, .. })
        ));
        assert!(matches!(
            mmu.add_device(RAM::new("high", 1 << 40, 16)),
            Err(MemoryError::OutsideAddressSpace { base: 0x100_0000_0000, .. })
        ));
        assert!(matches!(
            mmu.add_device(RAM::new("straddle", ADDRESS_SPACE_SIZE - 8, 16)),
            Err(MemoryError::OutsideAddressSpace { .. })
        ));
        assert_eq!(mmu.devices().count(), 0);

        mmu.add_device(RAM::new("last", ADDRESS_SPACE_SIZE - 16, 16))
            .unwrap();
        mmu.store32(0xFFFF_FFFC, 0xCAFE_F00D).unwrap();
        assert_eq!(mmu.load32(0xFFFF_FFFC).unwrap(), 0xCAFE_F00D);
    }

    #[test]
    fn load_data_past_the_end_of_u64() {
        let mut mmu = setup();
        assert_eq!(
            mmu.load_data(u64::MAX, &[1, 2]),
            Err(MemoryError::UnmappedAddress(u64::MAX))
        );
    }

    #[test]
    fn rejects_empty_devices() {
        let mut mmu = Mmu::new();
        assert!(matches!(
            mmu.add_device(RAM::new("empty", 0x100, 0)),
            Err(MemoryError::EmptyDevice(_))
        ));
    }

    #[test]
    fn stores_reach_the_device() {
        let mut mmu = Mmu::new();
        mmu.add_device(RAM::new("ram", 0x2000, 0x100)).unwrap();
        mmu.store16(0x2010, 0xBEEF).unwrap();
        assert_eq!(mmu.load16(0x2010).unwrap(), 0xBEEF);
        assert_eq!(mmu.load8(0x2011).unwrap(), 0xBE);
        assert!(matches!(
            mmu.store8(0x1FFF, 0),
            Err(MemoryError::UnmappedAddress(0x1FFF))
        ));
    }

    #[test]
    fn read_only_device_behind_mmu() {
        let mut mmu = setup();
        assert!(matches!(
            mmu.store8(0x10, 1),
            Err(MemoryError::ReadOnlyViolation { address: 0x10, .. })
        ));
    }

    #[test]
    fn load_data_seeds_bytes() {
        let mut mmu = Mmu::with_devices([
            Box::new(RAM::new("ram", 0, 0x100)) as Box<dyn MemoryDevice>,
            Box::new(DataMemory::zeroed("data", 0x100, 0x100)),
        ])
        .unwrap();
        mmu.load_data(0xFE, &[1, 2, 3, 4]).unwrap();
        assert_eq!(mmu.load16(0xFE).unwrap(), 0x0201);
        assert_eq!(mmu.load16(0x100).unwrap(), 0x0403);
        assert_eq!(mmu.stats().num_writes, 4);
        assert_eq!(mmu.stats().bytes_written, 4);
    }

    #[test]
    fn update_reaches_every_device() {
        #[derive(Debug)]
        struct Ticker {
            id: ComponentId,
            ticks: std::rc::Rc<std::cell::Cell<usize>>,
        }

        impl Component for Ticker {
            fn id(&self) -> &ComponentId {
                &self.id
            }
        }

        impl MemoryDevice for Ticker {
            fn base(&self) -> u64 {
                0x4000
            }

            fn size(&self) -> u64 {
                4
            }

            fn access(&mut self, _: MemoryRequest) -> MemoryResult<MemoryResponse> {
                Ok(MemoryResponse::Loaded(0))
            }

            fn update(&mut self) {
                self.ticks.set(self.ticks.get() + 1);
            }
        }

        let ticks = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut mmu = setup();
        mmu.add_device(Ticker {
            id: ComponentId::new("ticker"),
            ticks: ticks.clone(),
        })
        .unwrap();
        mmu.load8(0x4000).unwrap();
        assert_eq!(ticks.get(), 0);
        mmu.update_devices();
        mmu.update_devices();
        assert_eq!(ticks.get(), 2);
    }
}
