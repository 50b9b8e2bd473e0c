use crate::component::{Component, ComponentId};
use crate::memory::{Access, AccessStats, MemoryDevice, MemoryRequest, MemoryResponse, MemoryResult};

use super::StorageState;

/// General-purpose read/write storage.
#[derive(Clone, Debug)]
pub struct RAM {
    id: ComponentId,
    state: StorageState,
}

impl Component for RAM {
    fn id(&self) -> &ComponentId {
        &self.id
    }
}

impl MemoryDevice for RAM {
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

impl RAM {
    pub fn new(name: &str, base: u64, size: usize) -> Self {
        Self {
            id: ComponentId::new(name),
            state: StorageState::new(base, vec![0; size]),
        }
    }

    /// Snapshot of the current contents.
    pub fn data(&self) -> Vec<u8> {
        self.state.buffer.clone()
    }
}
