use crate::component::{Component, ComponentId};
use crate::memory::{Access, AccessStats, MemoryDevice, MemoryRequest, MemoryResponse, MemoryResult};

use super::StorageState;

/// Read/write storage that is guaranteed to start out zeroed.
#[derive(Clone, Debug)]
pub struct DataMemory {
    id: ComponentId,
    state: StorageState,
}

impl Component for DataMemory {
    fn id(&self) -> &ComponentId {
        &self.id
    }
}

impl MemoryDevice for DataMemory {
    fn base(&self) -> u64 {
        self.state.base
    }

    fn size(&self) -> u64 {
        self.state.size()
    }

    fn access(&mut self, request: MemoryRequest) -> MemoryResult<MemoryResponse> {
        match request.access {
            Access::Load => self.state.load(&self.id, &request),
            Access::Store(data) => self.state.store(&self.id, &request, data),
        }
    }

    fn stats(&self) -> AccessStats {
        self.state.stats
    }
}

impl DataMemory {
    pub fn zeroed(name: &str, base: u64, size: usize) -> Self {
        Self {
            id: ComponentId::new(name),
            state: StorageState::new(base, vec![0; size]),
        }
    }

    /// Zeroes the contents again; access statistics are kept.
    pub fn clear(&mut self) {
        self.state.buffer.fill(0);
    }
}
