use std::ops::Range;

use crate::component::ComponentId;
use crate::memory::{
    deserialize, serialize, AccessStats, MemoryError, MemoryRequest, MemoryResponse, MemoryResult,
};

mod data;
mod ram;
mod rom;

pub use data::DataMemory;
pub use ram::RAM;
pub use rom::ROM;

/// Byte storage shared by the concrete devices. Offsets are relative to `base`.
#[derive(Clone, Debug)]
struct StorageState {
    base: u64,
    buffer: Vec<u8>,
    stats: AccessStats,
}

impl StorageState {
    fn new(base: u64, buffer: Vec<u8>) -> Self {
        Self {
            base,
            buffer,
            stats: AccessStats::default(),
        }
    }

    fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn byte_range(&self, id: &ComponentId, request: &MemoryRequest) -> MemoryResult<Range<usize>> {
        let out_of_range = || MemoryError::OutOfRange {
            device: id.clone(),
            address: request.address,
            width: request.width,
        };
        let offset = request
            .address
            .checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(out_of_range)?;
        let end = offset
            .checked_add(request.width.bytes())
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(out_of_range)?;
        Ok(offset..end)
    }

    fn load(&mut self, id: &ComponentId, request: &MemoryRequest) -> MemoryResult<MemoryResponse> {
        let range = self.byte_range(id, request)?;
        self.stats.bytes_read += range.len();
        self.stats.num_reads += 1;
        let value = deserialize(&self.buffer[range]);
        tracing::trace!("{}: {} -> 0x{:X}", id, request, value);
        Ok(MemoryResponse::Loaded(value))
    }

    fn store(
        &mut self,
        id: &ComponentId,
        request: &MemoryRequest,
        data: u32,
    ) -> MemoryResult<MemoryResponse> {
        let range = self.byte_range(id, request)?;
        let bytes = serialize(data, request.width)?;
        self.stats.bytes_written += range.len();
        self.stats.num_writes += 1;
        self.buffer[range].copy_from_slice(&bytes);
        tracing::trace!("{}: {}", id, request);
        Ok(MemoryResponse::Stored)
    }
}
